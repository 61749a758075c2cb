use super::{ParseResult, Parser};
use crate::ast::{DeclKind, Declarator, Expr, ForHead, Stmt, SwitchCase};
use crate::frontend::lexer::Token;

impl<'src> Parser<'src> {
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.current().is_some_and(|t| t.is_open_selector()) {
            if let Some(stmt) = self.try_selector_arrow()? {
                return Ok(stmt);
            }
        }

        let loc = self.location();
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected("statement"));
        };
        let next = self.peek_at(1).cloned();
        match tok {
            Token::FileLoader if matches!(next, Some(Token::LParen) | Some(Token::LBrace)) => {
                self.parse_file_loader()
            }
            Token::Listen if next == Some(Token::LParen) => self.parse_listen(None),
            Token::Delegate if next == Some(Token::LParen) => self.parse_delegate(None),
            Token::Animate if next == Some(Token::LParen) => self.parse_animate(None),
            Token::Router if next == Some(Token::LParen) => self.parse_router(),
            Token::Vir if matches!(next, Some(Token::LParen) | Some(Token::Ident(_))) => {
                self.parse_vir()
            }
            Token::Util
                if !matches!(
                    next,
                    Some(Token::Dot) | Some(Token::Assign) | Some(Token::LParen) | None
                ) =>
            {
                self.parse_util()
            }
            Token::Var | Token::Let | Token::Const => {
                let stmt = self.parse_var_decl()?;
                self.consume_terminator()?;
                Ok(stmt)
            }
            Token::Function if matches!(next, Some(Token::Ident(_))) => {
                let def = self.parse_function()?;
                Ok(Stmt::Function { loc, def })
            }
            Token::LBrace => {
                let body = self.parse_block()?;
                Ok(Stmt::Block { loc, body })
            }
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::While => {
                self.bump();
                let condition = self.parse_paren_condition()?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::While {
                    loc,
                    condition,
                    body,
                })
            }
            Token::Do => {
                self.bump();
                let body = Box::new(self.parse_statement()?);
                self.expect(&Token::While, "'while' after do body")?;
                let condition = self.parse_paren_condition()?;
                self.consume_terminator()?;
                Ok(Stmt::DoWhile {
                    loc,
                    body,
                    condition,
                })
            }
            Token::Switch => self.parse_switch(),
            Token::Break | Token::Continue => {
                self.bump();
                let label = match self.peek() {
                    Some(Token::Ident(_)) if !self.newline_before() => {
                        Some(self.expect_ident("label")?)
                    }
                    _ => None,
                };
                self.consume_terminator()?;
                Ok(if tok == Token::Break {
                    Stmt::Break { loc, label }
                } else {
                    Stmt::Continue { loc, label }
                })
            }
            Token::Return => {
                self.bump();
                let value = if self.ends_statement() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_terminator()?;
                Ok(Stmt::Return { loc, value })
            }
            Token::Throw => {
                self.bump();
                let value = self.parse_expression()?;
                self.consume_terminator()?;
                Ok(Stmt::Throw { loc, value })
            }
            Token::Try => self.parse_try(),
            Token::Semicolon => {
                self.bump();
                Ok(Stmt::Empty { loc })
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_terminator()?;
                Ok(Stmt::Expr { loc, expr })
            }
        }
    }

    /// `{ statement* }`. Errors inside the block are recorded and the block
    /// keeps going so that one bad statement does not swallow its siblings.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut body = Vec::new();
        while !self.at_end() && !self.at_rbrace() {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(e) => {
                    self.report(e);
                    self.synchronize();
                }
            }
        }
        self.expect(&Token::RBrace, "'}' to close block")?;
        Ok(body)
    }

    /// Whether the cursor sits where an optional expression may be omitted.
    fn ends_statement(&mut self) -> bool {
        self.at_end()
            || self.check(&Token::Semicolon)
            || self.at_rbrace()
            || self.newline_before()
    }

    /// Automatic semicolon insertion: a `;` is required unless the statement
    /// ends a block, the input, or its line.
    pub(crate) fn consume_terminator(&mut self) -> ParseResult<()> {
        if self.eat(&Token::Semicolon) || self.at_end() || self.at_rbrace() || self.newline_before()
        {
            Ok(())
        } else {
            Err(self.unexpected("';' after statement"))
        }
    }

    fn parse_var_decl(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        let kind = match self.bump().map(|t| t.kind) {
            Some(Token::Var) => DeclKind::Var,
            Some(Token::Let) => DeclKind::Let,
            _ => DeclKind::Const,
        };
        let mut decls = Vec::new();
        loop {
            let name = self.expect_ident("variable name")?;
            let init = if self.eat(&Token::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if kind == DeclKind::Const && init.is_none() {
                self.report(self.error_here(format!("Missing initializer in const '{}'", name)));
            }
            decls.push(Declarator { name, init });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(Stmt::VarDecl { loc, kind, decls })
    }

    fn parse_paren_condition(&mut self) -> ParseResult<Expr> {
        self.expect(&Token::LParen, "'(' before condition")?;
        let condition = self.parse_expression()?;
        self.expect(&Token::RParen, "')' after condition")?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::If, "'if'")?;
        let condition = self.parse_paren_condition()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(&Token::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            loc,
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::For, "'for'")?;
        self.expect(&Token::LParen, "'(' after for")?;
        let head = match self.for_each_head()? {
            Some(head) => head,
            None => self.classic_for_head()?,
        };
        self.expect(&Token::RParen, "')' after for clauses")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For { loc, head, body })
    }

    /// `[var|let|const] name in|of expr`
    fn for_each_head(&mut self) -> ParseResult<Option<ForHead>> {
        let kind = match self.peek() {
            Some(Token::Var) => Some(DeclKind::Var),
            Some(Token::Let) => Some(DeclKind::Let),
            Some(Token::Const) => Some(DeclKind::Const),
            _ => None,
        };
        let skip = usize::from(kind.is_some());
        let of = match (self.peek_at(skip), self.peek_at(skip + 1)) {
            (Some(Token::Ident(_)), Some(Token::In)) => false,
            (Some(Token::Ident(_)), Some(Token::Of)) => true,
            _ => return Ok(None),
        };
        self.pos += skip;
        let name = self.expect_ident("loop variable")?;
        self.bump();
        let iterable = self.parse_expression()?;
        Ok(Some(ForHead::Each {
            kind,
            name,
            of,
            iterable,
        }))
    }

    fn classic_for_head(&mut self) -> ParseResult<ForHead> {
        let init = if self.check(&Token::Semicolon) {
            None
        } else if matches!(self.peek(), Some(Token::Var | Token::Let | Token::Const)) {
            Some(Box::new(self.parse_var_decl()?))
        } else {
            let loc = self.location();
            let expr = self.parse_expression()?;
            Some(Box::new(Stmt::Expr { loc, expr }))
        };
        self.expect(&Token::Semicolon, "';' after for initializer")?;
        let test = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&Token::Semicolon, "';' after for condition")?;
        let update = if self.check(&Token::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        Ok(ForHead::Classic { init, test, update })
    }

    fn parse_switch(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Switch, "'switch'")?;
        let discriminant = self.parse_paren_condition()?;
        self.expect(&Token::LBrace, "'{' after switch")?;
        let mut cases: Vec<SwitchCase> = Vec::new();
        while !self.at_end() && !self.at_rbrace() {
            let test = if self.eat(&Token::Default) {
                None
            } else {
                self.expect(&Token::Case, "'case' or 'default'")?;
                Some(self.parse_expression()?)
            };
            self.expect(&Token::Colon, "':' after case")?;
            let mut body = Vec::new();
            while !self.at_end()
                && !self.at_rbrace()
                && !self.check(&Token::Case)
                && !self.check(&Token::Default)
            {
                match self.parse_statement() {
                    Ok(stmt) => body.push(stmt),
                    Err(e) => {
                        self.report(e);
                        self.synchronize();
                    }
                }
            }
            cases.push(SwitchCase { test, body });
        }
        self.expect(&Token::RBrace, "'}' to close switch")?;
        Ok(Stmt::Switch {
            loc,
            discriminant,
            cases,
        })
    }

    fn parse_try(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Try, "'try'")?;
        let block = self.parse_block()?;
        let mut param = None;
        let handler = if self.eat(&Token::Catch) {
            if self.eat(&Token::LParen) {
                param = Some(self.expect_ident("catch parameter")?);
                self.expect(&Token::RParen, "')' after catch parameter")?;
            }
            Some(self.parse_block()?)
        } else {
            None
        };
        let finalizer = if self.eat(&Token::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("'catch' or 'finally' after try block"));
        }
        Ok(Stmt::Try {
            loc,
            block,
            param,
            handler,
            finalizer,
        })
    }
}
