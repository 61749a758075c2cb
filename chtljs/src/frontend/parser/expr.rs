use super::{ParseResult, Parser};
use crate::ast::{
    ArrowBody, AssignOp, BinOp, Expr, FunctionDef, Param, PropKey, Property, UnOp, UpdateOp,
};
use crate::frontend::lexer::Token;
use crate::node::EnhancedSelector;

/// Binary operators and their binding power. Higher binds tighter:
/// logical-or < logical-and < bitwise < equality < relational < shift
/// < additive < multiplicative < exponent.
fn binary_op(tok: &Token) -> Option<(BinOp, u8)> {
    Some(match tok {
        Token::OrOr => (BinOp::Or, 1),
        Token::Nullish => (BinOp::Nullish, 1),
        Token::AndAnd => (BinOp::And, 2),
        Token::Pipe => (BinOp::BitOr, 3),
        Token::Caret => (BinOp::BitXor, 4),
        Token::Amp => (BinOp::BitAnd, 5),
        Token::Eq => (BinOp::Eq, 6),
        Token::Neq => (BinOp::Neq, 6),
        Token::StrictEq => (BinOp::StrictEq, 6),
        Token::StrictNeq => (BinOp::StrictNeq, 6),
        Token::Lt => (BinOp::Lt, 7),
        Token::Gt => (BinOp::Gt, 7),
        Token::Le => (BinOp::Le, 7),
        Token::Ge => (BinOp::Ge, 7),
        Token::In => (BinOp::In, 7),
        Token::Instanceof => (BinOp::Instanceof, 7),
        Token::Shl => (BinOp::Shl, 8),
        Token::Shr => (BinOp::Shr, 8),
        Token::UShr => (BinOp::UShr, 8),
        Token::Plus => (BinOp::Add, 9),
        Token::Minus => (BinOp::Sub, 9),
        Token::Mul => (BinOp::Mul, 10),
        Token::Div => (BinOp::Div, 10),
        Token::Mod => (BinOp::Mod, 10),
        Token::Pow => (BinOp::Pow, 11),
        _ => return None,
    })
}

fn assign_op(tok: &Token) -> Option<AssignOp> {
    Some(match tok {
        Token::Assign => AssignOp::Assign,
        Token::PlusAssign => AssignOp::Add,
        Token::MinusAssign => AssignOp::Sub,
        Token::MulAssign => AssignOp::Mul,
        Token::DivAssign => AssignOp::Div,
        Token::ModAssign => AssignOp::Mod,
        _ => return None,
    })
}

impl<'src> Parser<'src> {
    /// expression := assignment (',' assignment)*
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        let first = self.parse_assignment()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            items.push(self.parse_assignment()?);
        }
        Ok(Expr::Sequence(items))
    }

    /// assignment := arrow | conditional (assignOp assignment)?
    pub(crate) fn parse_assignment(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        if let Some(arrow) = self.try_arrow()? {
            return Ok(arrow);
        }
        let target = self.parse_conditional()?;
        let Some(op) = self.peek().and_then(assign_op) else {
            return Ok(target);
        };
        if !matches!(
            target,
            Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. } | Expr::Selector(_)
        ) {
            return Err(self.error_here("Invalid assignment target"));
        }
        self.bump();
        let value = self.parse_assignment()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// conditional := binary ('?' assignment ':' assignment)?
    fn parse_conditional(&mut self) -> ParseResult<Expr> {
        let test = self.parse_binary(1)?;
        if !self.eat(&Token::Question) {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(&Token::Colon, "':' in conditional expression")?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    /// Precedence climbing over [`binary_op`]. `**` is right-associative.
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        while let Some((op, prec)) = self.peek().and_then(binary_op) {
            if prec < min_prec {
                break;
            }
            self.bump();
            let next_min = if op == BinOp::Pow { prec } else { prec + 1 };
            let right = self.parse_binary(next_min)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// unary := ('!' | '-' | '+' | '~' | typeof | void | delete) unary
    ///        | ('++' | '--') unary
    ///        | postfix
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek() {
            Some(Token::Not) => UnOp::Not,
            Some(Token::Minus) => UnOp::Neg,
            Some(Token::Plus) => UnOp::Plus,
            Some(Token::Tilde) => UnOp::BitNot,
            Some(Token::Typeof) => UnOp::Typeof,
            Some(Token::Void) => UnOp::Void,
            Some(Token::Delete) => UnOp::Delete,
            Some(Token::Increment) | Some(Token::Decrement) => {
                let op = if self.check(&Token::Increment) {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                self.bump();
                let operand = self.nested(Self::parse_unary)?;
                return Ok(Expr::Update {
                    op,
                    prefix: true,
                    operand: Box::new(operand),
                });
            }
            _ => return self.parse_postfix(),
        };
        self.bump();
        let operand = self.nested(Self::parse_unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// postfix := callOrMember ('++' | '--')?
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let expr = if self.check(&Token::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let expr = self.parse_call_member(expr, true)?;
        let op = match self.peek() {
            Some(Token::Increment) if !self.newline_before() => UpdateOp::Increment,
            Some(Token::Decrement) if !self.newline_before() => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        self.bump();
        Ok(Expr::Update {
            op,
            prefix: false,
            operand: Box::new(expr),
        })
    }

    fn parse_new(&mut self) -> ParseResult<Expr> {
        self.expect(&Token::New, "'new'")?;
        let callee = if self.check(&Token::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let callee = self.parse_call_member(callee, false)?;
        let args = if self.check(&Token::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::New {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_call_member(&mut self, mut expr: Expr, allow_call: bool) -> ParseResult<Expr> {
        loop {
            match self.peek() {
                // `->` is the CHTL JS spelling of member access.
                Some(Token::Dot) | Some(Token::Arrow) => {
                    self.bump();
                    let property = self.parse_property_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                Some(Token::LBracket) => {
                    self.bump();
                    let index = self.parse_expression()?;
                    self.expect(&Token::RBracket, "']'")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Some(Token::LParen) if allow_call => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Identifier or reserved word after `.`.
    fn parse_property_name(&mut self) -> ParseResult<String> {
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            Some(tok) => match tok.keyword() {
                Some(kw) => kw.to_string(),
                None => return Err(self.unexpected("property name")),
            },
            None => return Err(self.unexpected("property name")),
        };
        self.bump();
        Ok(name)
    }

    pub(crate) fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        while !self.check(&Token::RParen) {
            if self.eat(&Token::Spread) {
                args.push(Expr::Spread(Box::new(self.parse_assignment()?)));
            } else {
                args.push(self.parse_assignment()?);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        if self.current().is_some_and(|t| t.is_open_selector()) {
            return Ok(Expr::Selector(self.parse_selector()?));
        }
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected("expression"));
        };
        let expr = match tok {
            Token::Number(n) => Expr::Number(n),
            Token::Str(s) => Expr::Str(s),
            Token::Template(s) => Expr::Template(s),
            Token::Regex(s) => Expr::Regex(s),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Null => Expr::Null,
            Token::Undefined => Expr::Undefined,
            Token::This => Expr::This,
            Token::Ident(name) => Expr::Ident(name),
            // CHTL JS keywords outside their statement forms are plain names.
            ref t if t.is_chtl_keyword() || *t == Token::Of => {
                Expr::Ident(t.keyword().unwrap_or_default().to_string())
            }
            Token::LParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                return Ok(inner);
            }
            Token::LBracket => return self.parse_array(),
            Token::LBrace => return Ok(Expr::Object(self.parse_object()?)),
            Token::Function => return Ok(Expr::Function(self.parse_function()?)),
            _ => return Err(self.unexpected("expression")),
        };
        self.bump();
        Ok(expr)
    }

    /// `{{ selector }}`: the raw text between the delimiters is the selector.
    pub(crate) fn parse_selector(&mut self) -> ParseResult<EnhancedSelector> {
        let open = match self.current() {
            Some(t) if t.is_open_selector() => t.span.clone(),
            _ => return Err(self.unexpected("'{{'")),
        };
        self.bump();
        loop {
            match self.current() {
                None => return Err(self.error_here("Unclosed enhanced selector")),
                Some(t) if t.is_close_selector() => break,
                Some(t) if t.is_open_selector() => {
                    return Err(self.error_here("Nested enhanced selector"));
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let close = self.current().map(|t| t.span.clone()).unwrap_or(open.clone());
        self.bump();
        let body = open.end..close.start;
        self.note_selector_span(body.clone());
        Ok(EnhancedSelector::new(self.source_slice(body)))
    }

    fn parse_array(&mut self) -> ParseResult<Expr> {
        self.expect(&Token::LBracket, "'['")?;
        let mut items = Vec::new();
        while !self.check(&Token::RBracket) {
            if self.eat(&Token::Spread) {
                items.push(Expr::Spread(Box::new(self.parse_assignment()?)));
            } else {
                items.push(self.parse_assignment()?);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBracket, "']' after array elements")?;
        Ok(Expr::Array(items))
    }

    /// `{ key: value, shorthand, method() {}, ...spread }`
    pub(crate) fn parse_object(&mut self) -> ParseResult<Vec<Property>> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut props = Vec::new();
        while !self.at_rbrace() {
            if self.eat(&Token::Spread) {
                props.push(Property::Spread(self.parse_assignment()?));
            } else {
                props.push(self.parse_object_property()?);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RBrace, "'}' after object properties")?;
        Ok(props)
    }

    fn parse_object_property(&mut self) -> ParseResult<Property> {
        let key = match self.peek().cloned() {
            Some(Token::Ident(name)) => PropKey::Ident(name),
            Some(Token::Str(s)) => PropKey::Str(s),
            Some(Token::Number(n)) => PropKey::Number(n),
            Some(Token::LBracket) => {
                self.bump();
                let key = self.parse_assignment()?;
                self.expect(&Token::RBracket, "']' after computed key")?;
                self.expect(&Token::Colon, "':' after computed key")?;
                let value = self.parse_assignment()?;
                return Ok(Property::KeyValue {
                    key: PropKey::Computed(Box::new(key)),
                    value,
                });
            }
            Some(tok) => match tok.keyword() {
                Some(kw) => PropKey::Ident(kw.to_string()),
                None => return Err(self.unexpected("property key")),
            },
            None => return Err(self.unexpected("property key")),
        };
        self.bump();

        if self.eat(&Token::Colon) {
            let value = self.parse_assignment()?;
            return Ok(Property::KeyValue { key, value });
        }
        if self.check(&Token::LParen) {
            let params = self.parse_params()?;
            let body = self.parse_block()?;
            return Ok(Property::KeyValue {
                key,
                value: Expr::Function(FunctionDef {
                    name: None,
                    params,
                    body,
                }),
            });
        }
        match key {
            PropKey::Ident(name) => Ok(Property::Shorthand(name)),
            _ => Err(self.unexpected("':' after property key")),
        }
    }

    /// `function name? (params) { body }`
    pub(crate) fn parse_function(&mut self) -> ParseResult<FunctionDef> {
        self.expect(&Token::Function, "'function'")?;
        let name = match self.peek() {
            Some(Token::Ident(_)) => Some(self.expect_ident("function name")?),
            _ => None,
        };
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(FunctionDef { name, params, body })
    }

    pub(crate) fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(&Token::LParen, "'(' before parameters")?;
        let mut params = Vec::new();
        while !self.check(&Token::RParen) {
            let rest = self.eat(&Token::Spread);
            let name = self.expect_ident("parameter name")?;
            let default = if self.eat(&Token::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                rest,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen, "')' after parameters")?;
        Ok(params)
    }

    /// Arrow function if one starts here: `x => ...` or `(a, b) => ...`.
    fn try_arrow(&mut self) -> ParseResult<Option<Expr>> {
        let params = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Ident(name)), Some(Token::FatArrow)) => {
                let name = name.clone();
                self.pos += 2;
                vec![Param::simple(name)]
            }
            (Some(Token::LParen), _) if self.paren_followed_by_arrow() => {
                let params = self.parse_params()?;
                self.expect(&Token::FatArrow, "'=>'")?;
                params
            }
            _ => return Ok(None),
        };
        let body = if self.check(&Token::LBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment()?))
        };
        Ok(Some(Expr::Arrow { params, body }))
    }

    /// Whether the parenthesized group starting at the cursor is followed by `=>`.
    fn paren_followed_by_arrow(&self) -> bool {
        let mut depth = 0usize;
        let mut i = 0;
        while let Some(tok) = self.peek_at(i) {
            match tok {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.peek_at(i + 1) == Some(&Token::FatArrow);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        false
    }
}
