use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r\n\f\u{FEFF}]+")] // Whitespace (and a stray byte-order mark)
#[logos(skip r"//[^\n]*")] // Line comments
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")] // Block comments
pub enum Token {
    // --- Core JavaScript keywords ---
    #[token("var")]
    Var,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("new")]
    New,
    #[token("typeof")]
    Typeof,
    #[token("instanceof")]
    Instanceof,
    #[token("in")]
    In,
    #[token("of")]
    Of,
    #[token("this")]
    This,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("delete")]
    Delete,
    #[token("void")]
    Void,

    // --- Literal keywords ---
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // --- CHTL JS keywords ---
    #[token("fileloader")]
    FileLoader,
    #[token("listen")]
    Listen,
    #[token("delegate")]
    Delegate,
    #[token("animate")]
    Animate,
    #[token("vir")]
    Vir,
    #[token("router")]
    Router,
    #[token("util")]
    Util,
    #[token("iNeverAway")]
    INeverAway,

    // --- Identifiers and literals ---
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Numeric literal, kept in its source spelling.
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    /// String literal, kept with its quotes and escapes.
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    #[regex(r#"'([^'\\\n]|\\.)*'"#, |lex| lex.slice().to_string())]
    Str(String),

    /// Template literal, kept verbatim including backticks.
    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice().to_string())]
    Template(String),

    /// Regular expression literal with its slashes and flags. Never matched
    /// by the derive; `tokenize` re-reads a `/` in operand position as one.
    Regex(String),

    // --- Enhanced selector delimiter (same kind for `{{` and `}}`) ---
    #[token("{{")]
    #[token("}}")]
    DoubleBrace,

    // --- Punctuation ---
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Spread,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("=>")]
    FatArrow,
    #[token("->")]
    Arrow,
    #[token("#")]
    Hash,

    // --- Operators ---
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("==")]
    Eq,
    #[token("===")]
    StrictEq,
    #[token("!=")]
    Neq,
    #[token("!==")]
    StrictNeq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Mul,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,
    #[token("**")]
    Pow,
    #[token("++")]
    Increment,
    #[token("--")]
    Decrement,
    #[token("!")]
    Not,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("??")]
    Nullish,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
}

impl Token {
    /// The keyword spelling of reserved words (core and CHTL JS), if any.
    pub fn keyword(&self) -> Option<&'static str> {
        Some(match self {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Function => "function",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Do => "do",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Return => "return",
            Token::Then => "then",
            Token::New => "new",
            Token::Typeof => "typeof",
            Token::Instanceof => "instanceof",
            Token::In => "in",
            Token::Of => "of",
            Token::This => "this",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::Throw => "throw",
            Token::Delete => "delete",
            Token::Void => "void",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Undefined => "undefined",
            Token::FileLoader => "fileloader",
            Token::Listen => "listen",
            Token::Delegate => "delegate",
            Token::Animate => "animate",
            Token::Vir => "vir",
            Token::Router => "router",
            Token::Util => "util",
            Token::INeverAway => "iNeverAway",
            _ => return None,
        })
    }

    pub fn is_chtl_keyword(&self) -> bool {
        matches!(
            self,
            Token::FileLoader
                | Token::Listen
                | Token::Delegate
                | Token::Animate
                | Token::Vir
                | Token::Router
                | Token::Util
                | Token::INeverAway
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kw) = self.keyword() {
            return write!(f, "{}", kw);
        }
        match self {
            Token::Ident(s) => write!(f, "'{}'", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "{}", s),
            Token::Template(s) => write!(f, "{}", s),
            Token::Regex(s) => write!(f, "{}", s),
            Token::DoubleBrace => write!(f, "'{{{{' or '}}}}'"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Spread => write!(f, "..."),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::FatArrow => write!(f, "=>"),
            Token::Arrow => write!(f, "->"),
            Token::Hash => write!(f, "#"),
            Token::Assign => write!(f, "="),
            Token::PlusAssign => write!(f, "+="),
            Token::MinusAssign => write!(f, "-="),
            Token::MulAssign => write!(f, "*="),
            Token::DivAssign => write!(f, "/="),
            Token::ModAssign => write!(f, "%="),
            Token::Eq => write!(f, "=="),
            Token::StrictEq => write!(f, "==="),
            Token::Neq => write!(f, "!="),
            Token::StrictNeq => write!(f, "!=="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Mul => write!(f, "*"),
            Token::Div => write!(f, "/"),
            Token::Mod => write!(f, "%"),
            Token::Pow => write!(f, "**"),
            Token::Increment => write!(f, "++"),
            Token::Decrement => write!(f, "--"),
            Token::Not => write!(f, "!"),
            Token::Tilde => write!(f, "~"),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Nullish => write!(f, "??"),
            Token::Shl => write!(f, "<<"),
            Token::Shr => write!(f, ">>"),
            Token::UShr => write!(f, ">>>"),
            _ => Ok(()),
        }
    }
}

/// A token together with its literal text and 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub kind: Token,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub span: Range<usize>,
}

impl SpannedToken {
    pub fn is_open_selector(&self) -> bool {
        self.kind == Token::DoubleBrace && self.text == "{{"
    }

    pub fn is_close_selector(&self) -> bool {
        self.kind == Token::DoubleBrace && self.text == "}}"
    }
}

/// Custom error type for lexical errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub location: usize,
    pub line: usize,
    pub column: usize,
    pub unexpected_char: char,
    pub context: String,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unexpected character '{}' at line {}, column {} (position {})\n  Context: {}",
            self.unexpected_char, self.line, self.column, self.location, self.context
        )
    }
}

impl std::error::Error for LexicalError {}

/// Convert a byte position to line and column numbers (1-based)
pub fn position_to_line_col(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Get context around an error position (the line containing the error)
pub fn get_error_context(source: &str, position: usize) -> String {
    let position = position.min(source.len());
    let line_start = source[..position]
        .rfind('\n')
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let line_end = source[position..]
        .find('\n')
        .map(|pos| position + pos)
        .unwrap_or(source.len());

    source[line_start..line_end].trim().to_string()
}

/// Byte offsets of every line start, for cheap offset -> (line, col) lookups.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let col = source[self.starts[line]..offset].chars().count();
        (line + 1, col + 1)
    }
}

/// A `/` after these tokens is a division; anywhere else it opens a regular
/// expression literal.
fn regex_allowed(prev: Option<&SpannedToken>) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    !matches!(
        prev.kind,
        Token::Ident(_)
            | Token::Number(_)
            | Token::Str(_)
            | Token::Template(_)
            | Token::Regex(_)
            | Token::RParen
            | Token::RBracket
            | Token::RBrace
            | Token::This
            | Token::True
            | Token::False
            | Token::Null
            | Token::Undefined
            | Token::Increment
            | Token::Decrement
    ) && !prev.is_close_selector()
}

/// Byte length of the regular expression literal at the start of `rest`
/// (which begins with `/`), flags included. `None` when the line ends first.
fn regex_literal_len(rest: &str) -> Option<usize> {
    let mut in_class = false;
    let mut escaped = false;
    let mut body_end = None;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\n' | '\r' => return None,
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                body_end = Some(i + 1);
                break;
            }
            _ => {}
        }
    }
    let end = body_end?;
    let flags = rest[end..]
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len() - end);
    Some(end + flags)
}

/// Output of [`tokenize`]: the token stream plus any characters it had to skip.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<SpannedToken>,
    pub errors: Vec<LexicalError>,
}

/// Convert source text into a token stream.
///
/// Always terminates: unrecognized input is reported as a [`LexicalError`]
/// and skipped, so the caller still gets every token that could be formed.
pub fn tokenize(source: &str) -> Lexed {
    let index = LineIndex::new(source);
    let mut lexer = Token::lexer(source);
    let mut out = Lexed::default();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.line_col(source, span.start);
        match result {
            Ok(kind @ (Token::Div | Token::DivAssign)) if regex_allowed(out.tokens.last()) => {
                match regex_literal_len(&source[span.start..]) {
                    Some(len) => {
                        lexer.bump(len - span.len());
                        out.tokens.push(SpannedToken {
                            kind: Token::Regex(lexer.slice().to_string()),
                            text: lexer.slice().to_string(),
                            line,
                            column,
                            span: lexer.span(),
                        });
                    }
                    None => out.tokens.push(SpannedToken {
                        kind,
                        text: lexer.slice().to_string(),
                        line,
                        column,
                        span,
                    }),
                }
            }
            Ok(kind) => out.tokens.push(SpannedToken {
                kind,
                text: lexer.slice().to_string(),
                line,
                column,
                span,
            }),
            Err(_) => out.errors.push(LexicalError {
                location: span.start,
                line,
                column,
                unexpected_char: source[span.start..].chars().next().unwrap_or('\0'),
                context: get_error_context(source, span.start),
            }),
        }
    }

    log::trace!(
        "tokenized {} bytes into {} tokens ({} lexical errors)",
        source.len(),
        out.tokens.len(),
        out.errors.len()
    );
    out
}
