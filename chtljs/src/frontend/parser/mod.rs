//! Hand-written recursive-descent parser for CHTL JS.
//!
//! Expressions use precedence climbing (see `expr.rs`); statements and the
//! CHTL JS statement forms live in `stmt.rs` and `chtl.rs`. Errors never
//! abort the parse: each one is recorded with its position and the parser
//! resynchronizes at the next statement or block boundary.

mod chtl;
mod expr;
mod stmt;

use crate::ast::Program;
use crate::frontend::lexer::{self, LexicalError, SpannedToken, Token};
use crate::{CompileError, SourceLocation};
use std::ops::Range;

pub type ParseResult<T> = Result<T, CompileError>;

/// Deepest statement/expression nesting accepted before the parser gives up
/// on the construct instead of exhausting the stack.
const MAX_NESTING: usize = 100;

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<SpannedToken>,
    pos: usize,
    errors: Vec<CompileError>,
    lexical_errors: Vec<LexicalError>,
    /// Byte ranges of `{{ ... }}` bodies; lexical errors inside them are not errors.
    selector_spans: Vec<Range<usize>>,
    depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let lexed = lexer::tokenize(source);
        Self {
            source,
            tokens: lexed.tokens,
            pos: 0,
            errors: Vec::new(),
            lexical_errors: lexed.errors,
            selector_spans: Vec::new(),
            depth: 0,
        }
    }

    /// Parse the whole input. Always returns a program; the second value
    /// lists every error found along the way, in source order.
    pub fn parse(mut self) -> (Program, Vec<CompileError>) {
        let mut statements = Vec::new();
        while !self.at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                    // A closer with no open block at the top level is skipped.
                    if self.check(&Token::RBrace)
                        || self.current().is_some_and(|t| t.is_close_selector())
                    {
                        self.pos += 1;
                    }
                }
            }
        }
        log::debug!(
            "parsed {} top-level statements with {} errors",
            statements.len(),
            self.errors.len()
        );
        let errors = self.finish_errors();
        (Program { statements }, errors)
    }

    fn finish_errors(&mut self) -> Vec<CompileError> {
        let spans = std::mem::take(&mut self.selector_spans);
        let mut errors: Vec<CompileError> = self
            .lexical_errors
            .drain(..)
            .filter(|e| !spans.iter().any(|s| s.contains(&e.location)))
            .map(CompileError::Lexical)
            .collect();
        errors.append(&mut self.errors);
        errors.sort_by_key(|e| match e {
            CompileError::Lexical(l) => (l.line, l.column),
            CompileError::Parse { line, col, .. } => (*line, *col),
            CompileError::Validation(_) => (0, 0),
        });
        errors
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    pub(crate) fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    pub(crate) fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn bump(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn check(&self, kind: &Token) -> bool {
        self.peek() == Some(kind)
    }

    pub(crate) fn eat(&mut self, kind: &Token) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &Token, what: &str) -> ParseResult<SpannedToken> {
        if kind == &Token::RBrace {
            self.split_double_close();
        }
        if self.check(kind) {
            self.bump().ok_or_else(|| self.unexpected(what))
        } else {
            Err(self.unexpected(what))
        }
    }

    /// `}}` closing two nested blocks is lexed as one selector delimiter;
    /// split it back into two `}` tokens when a block close is expected.
    pub(crate) fn split_double_close(&mut self) {
        let Some(tok) = self.tokens.get(self.pos) else {
            return;
        };
        if !tok.is_close_selector() {
            return;
        }
        let first = SpannedToken {
            kind: Token::RBrace,
            text: "}".to_string(),
            line: tok.line,
            column: tok.column,
            span: tok.span.start..tok.span.start + 1,
        };
        let second = SpannedToken {
            kind: Token::RBrace,
            text: "}".to_string(),
            line: tok.line,
            column: tok.column + 1,
            span: tok.span.start + 1..tok.span.end,
        };
        self.tokens[self.pos] = first;
        self.tokens.insert(self.pos + 1, second);
    }

    /// Whether the next token closes a block (splitting `}}` if needed).
    pub(crate) fn at_rbrace(&mut self) -> bool {
        self.split_double_close();
        self.check(&Token::RBrace)
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Whether the next token starts on a later line than the previous one.
    pub(crate) fn newline_before(&self) -> bool {
        match (self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)), self.current()) {
            (Some(prev), Some(cur)) => self.source[prev.span.end..cur.span.start].contains('\n'),
            _ => true,
        }
    }

    pub(crate) fn location(&self) -> SourceLocation {
        match self.current() {
            Some(t) => SourceLocation::new(t.line, t.column, t.span.start),
            None => {
                let (line, column) = lexer::position_to_line_col(self.source, self.source.len());
                SourceLocation::new(line, column, self.source.len())
            }
        }
    }

    pub(crate) fn source_slice(&self, range: Range<usize>) -> &'src str {
        &self.source[range]
    }

    pub(crate) fn note_selector_span(&mut self, range: Range<usize>) {
        self.selector_spans.push(range);
    }

    /// Run `f` one nesting level deeper, failing once [`MAX_NESTING`] is hit.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here("Nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ── Errors ──────────────────────────────────────────────────────────

    pub(crate) fn error_here(&self, message: impl Into<String>) -> CompileError {
        let loc = self.location();
        CompileError::Parse {
            line: loc.line,
            col: loc.column,
            context: lexer::get_error_context(self.source, loc.offset),
            message: message.into(),
        }
    }

    pub(crate) fn error_at(&self, loc: SourceLocation, message: impl Into<String>) -> CompileError {
        CompileError::Parse {
            line: loc.line,
            col: loc.column,
            context: lexer::get_error_context(self.source, loc.offset),
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> CompileError {
        match self.current() {
            Some(tok) => self.error_here(format!(
                "Unexpected token '{}'. Expected {}",
                tok.text, expected
            )),
            None => self.error_here(format!("Unexpected end of input. Expected {}", expected)),
        }
    }

    /// Record a non-fatal error and keep parsing.
    pub(crate) fn report(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    /// Skip ahead to the next statement or block boundary. A block closer is
    /// left in place for the enclosing block to consume.
    pub(crate) fn synchronize(&mut self) {
        let start = self.pos;
        while let Some(tok) = self.peek().cloned() {
            match tok {
                Token::Semicolon => {
                    self.pos += 1;
                    return;
                }
                Token::RBrace => return,
                Token::DoubleBrace if self.current().is_some_and(|t| t.is_close_selector()) => {
                    return
                }
                Token::DoubleBrace if self.pos > start => return,
                Token::Var
                | Token::Let
                | Token::Const
                | Token::Function
                | Token::If
                | Token::For
                | Token::While
                | Token::Do
                | Token::Switch
                | Token::Return
                | Token::Try
                | Token::Throw
                | Token::FileLoader
                | Token::Listen
                | Token::Delegate
                | Token::Animate
                | Token::Vir
                | Token::Router
                | Token::Util
                    if self.pos > start =>
                {
                    return
                }
                _ => self.pos += 1,
            }
        }
    }
}

/// Parse `source` into a program plus every error encountered.
pub fn parse_program(source: &str) -> (Program, Vec<CompileError>) {
    Parser::new(source).parse()
}
