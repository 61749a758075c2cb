use chtljs::frontend::lexer::{tokenize, Token};

fn kinds(source: &str) -> Vec<Token> {
    tokenize(source).tokens.into_iter().map(|t| t.kind).collect()
}

// ── Keywords ─────────────────────────────────────────────────────────────

#[test]
fn chtl_keywords_are_distinct_tokens() {
    assert_eq!(
        kinds("fileloader listen delegate animate vir router util iNeverAway"),
        vec![
            Token::FileLoader,
            Token::Listen,
            Token::Delegate,
            Token::Animate,
            Token::Vir,
            Token::Router,
            Token::Util,
            Token::INeverAway,
        ]
    );
}

#[test]
fn keywords_need_a_word_boundary() {
    assert_eq!(
        kinds("variable listener then"),
        vec![
            Token::Ident("variable".to_string()),
            Token::Ident("listener".to_string()),
            Token::Then,
        ]
    );
}

// ── Selector delimiters ─────────────────────────────────────────────────

#[test]
fn double_brace_is_one_kind_for_both_ends() {
    let lexed = tokenize("{{.box}}");
    let kinds: Vec<&Token> = lexed.tokens.iter().map(|t| &t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            &Token::DoubleBrace,
            &Token::Dot,
            &Token::Ident("box".to_string()),
            &Token::DoubleBrace,
        ]
    );
    assert!(lexed.tokens[0].is_open_selector());
    assert!(lexed.tokens[3].is_close_selector());
}

#[test]
fn single_braces_stay_separate() {
    assert_eq!(kinds("{ }"), vec![Token::LBrace, Token::RBrace]);
}

// ── Literals ────────────────────────────────────────────────────────────

#[test]
fn literals_keep_their_spelling() {
    assert_eq!(
        kinds(r#"0x1F 1.5e3 .5 'it\'s' "a" `t`"#),
        vec![
            Token::Number("0x1F".to_string()),
            Token::Number("1.5e3".to_string()),
            Token::Number(".5".to_string()),
            Token::Str(r"'it\'s'".to_string()),
            Token::Str("\"a\"".to_string()),
            Token::Template("`t`".to_string()),
        ]
    );
}

#[test]
fn literal_keywords() {
    assert_eq!(
        kinds("true false null undefined"),
        vec![Token::True, Token::False, Token::Null, Token::Undefined]
    );
}

#[test]
fn slash_in_operand_position_is_a_regex() {
    assert_eq!(
        kinds("s.replace(/a[/]b\\//gi, x)"),
        vec![
            Token::Ident("s".to_string()),
            Token::Dot,
            Token::Ident("replace".to_string()),
            Token::LParen,
            Token::Regex(r"/a[/]b\//gi".to_string()),
            Token::Comma,
            Token::Ident("x".to_string()),
            Token::RParen,
        ]
    );
}

#[test]
fn slash_after_an_operand_is_division() {
    assert_eq!(
        kinds("a / b / c"),
        vec![
            Token::Ident("a".to_string()),
            Token::Div,
            Token::Ident("b".to_string()),
            Token::Div,
            Token::Ident("c".to_string()),
        ]
    );
    assert_eq!(
        kinds("(a) /= 2"),
        vec![
            Token::LParen,
            Token::Ident("a".to_string()),
            Token::RParen,
            Token::DivAssign,
            Token::Number("2".to_string()),
        ]
    );
}

#[test]
fn unterminated_regex_falls_back_to_division() {
    assert_eq!(
        kinds("a = /\nb"),
        vec![
            Token::Ident("a".to_string()),
            Token::Assign,
            Token::Div,
            Token::Ident("b".to_string()),
        ]
    );
}

// ── Operators ───────────────────────────────────────────────────────────

#[test]
fn longest_operator_wins() {
    assert_eq!(
        kinds("=== !== >>> ** ?? -> => ..."),
        vec![
            Token::StrictEq,
            Token::StrictNeq,
            Token::UShr,
            Token::Pow,
            Token::Nullish,
            Token::Arrow,
            Token::FatArrow,
            Token::Spread,
        ]
    );
}

// ── Trivia and positions ────────────────────────────────────────────────

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("a // line\n/* block\n comment */ b"),
        vec![Token::Ident("a".to_string()), Token::Ident("b".to_string())]
    );
}

#[test]
fn positions_are_one_based() {
    let lexed = tokenize("a\n  b");
    let b = &lexed.tokens[1];
    assert_eq!((b.line, b.column), (2, 3));
    assert_eq!(b.text, "b");
    assert_eq!(b.span, 4..5);
}

#[test]
fn unknown_characters_are_reported_and_skipped() {
    let lexed = tokenize("a @ b");
    assert_eq!(lexed.tokens.len(), 2);
    assert_eq!(lexed.errors.len(), 1);
    let err = &lexed.errors[0];
    assert_eq!(err.unexpected_char, '@');
    assert_eq!((err.line, err.column), (1, 3));
    assert_eq!(err.context, "a @ b");
}

#[test]
fn empty_input_has_no_tokens() {
    let lexed = tokenize("");
    assert!(lexed.tokens.is_empty());
    assert!(lexed.errors.is_empty());
}
