use chtljs::{compile_to_js, parse, ChtlJsCompiler, CompileError, Severity};

// ── Diagnostic text ─────────────────────────────────────────────────────

#[test]
fn missing_expression_is_located() {
    let mut compiler = ChtlJsCompiler::new();
    assert_eq!(compiler.compile("var a = ;"), "");
    assert_eq!(
        compiler.error_messages(),
        vec!["Error: Unexpected token ';'. Expected expression (line 1, column 9)"]
    );
}

#[test]
fn parse_error_display_carries_context() {
    let err = compile_to_js("var = 1;").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parse error at 1:5: Unexpected token '='. Expected variable name\n  Context: var = 1;"
    );
}

#[test]
fn end_of_input_is_named() {
    let (_, errors) = parse("var a =");
    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .to_string()
        .contains("Unexpected end of input. Expected expression"));
}

// ── Partial output ──────────────────────────────────────────────────────

#[test]
fn good_statements_still_compile() {
    let mut compiler = ChtlJsCompiler::new();
    let out = compiler.compile("var a = 1;\nvar b = ;\nvar c = 3;");
    assert!(out.contains("    var a = 1;\n"));
    assert!(out.contains("    var c = 3;\n"));
    assert!(!out.contains("var b"));
    assert!(compiler.has_errors());
    assert_eq!(compiler.errors().len(), 1);
    assert_eq!(compiler.errors()[0].location.map(|l| l.line), Some(2));
}

#[test]
fn errors_option_silences_parse_errors() {
    let mut compiler = ChtlJsCompiler::new();
    compiler.set_compile_option("errors", "false");
    let out = compiler.compile("var a = 1;\nvar b = ;");
    assert!(out.contains("var a = 1;"));
    assert!(compiler.errors().is_empty());
    assert!(!compiler.has_errors());
}

// ── Lexical errors ──────────────────────────────────────────────────────

#[test]
fn stray_character_is_a_diagnostic() {
    let mut compiler = ChtlJsCompiler::new();
    let out = compiler.compile("var a = 1;\n@\nvar b = 2;");
    assert!(out.contains("var a = 1;"));
    assert!(out.contains("var b = 2;"));
    assert_eq!(
        compiler.error_messages(),
        vec!["Error: Unexpected character '@' (line 2, column 1)"]
    );
    assert_eq!(compiler.errors()[0].severity, Severity::Error);
}

#[test]
fn lexical_error_converts_from_the_lexer() {
    let (_, errors) = parse("@");
    assert!(matches!(&errors[0], CompileError::Lexical(e) if e.unexpected_char == '@'));
    assert!(errors[0]
        .to_string()
        .starts_with("Lexical error: Unexpected character '@' at line 1, column 1"));
}

#[test]
fn characters_inside_selectors_are_not_lexical_errors() {
    let (_, errors) = parse("var icon = {{.icon@2x}};");
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(
        compile_to_js("var icon = {{.icon@2x}};").unwrap_or_default(),
        "var icon = document.querySelector('.icon@2x');"
    );
}

// ── Selector errors ─────────────────────────────────────────────────────

#[test]
fn unclosed_selector_during_parse() {
    let (_, errors) = parse("var a = {{.box;");
    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("Unclosed enhanced selector")));
}

#[test]
fn nested_selector_during_parse() {
    let (_, errors) = parse("var a = {{.a {{.b}} }};");
    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("Nested enhanced selector")));
}

// ── CHTL JS form errors ─────────────────────────────────────────────────

#[test]
fn invalid_listen_arguments() {
    let (program, errors) = parse("listen({{.a}}, 1, 2, 3);\nok();");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "Parse error at 1:1: Invalid listen arguments\n  Context: listen({{.a}}, 1, 2, 3);"
    );
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn invalid_delegate_arguments() {
    let (_, errors) = parse("delegate(42, 'click', f);");
    assert!(errors[0].to_string().contains("Invalid delegate arguments"));
}

#[test]
fn unknown_router_mode() {
    let (_, errors) = parse("router({ mode: 'push', url: '/' });");
    assert!(errors[0]
        .to_string()
        .contains("Unknown router mode 'push'; expected 'hash' or 'history'"));
}

#[test]
fn route_without_url() {
    let (_, errors) = parse("router({ routes: [{ page: '#home' }] });");
    assert!(errors[0].to_string().contains("route is missing its url"));
}

#[test]
fn animate_numbers_are_checked() {
    let (_, errors) = parse("animate({{.a}}, { duration: 'slow' });");
    assert!(errors[0].to_string().contains("animate duration must be a number"));
}

#[test]
fn util_requires_then() {
    let (_, errors) = parse("util ready start();");
    assert!(errors[0].to_string().contains("Expected 'then' after util condition"));
}

// ── Nesting ─────────────────────────────────────────────────────────────

#[test]
fn deep_nesting_is_reported_instead_of_overflowing() {
    let source = format!("var a = {}1{};\nvar b = 2;", "(".repeat(500), ")".repeat(500));
    let (program, errors) = parse(&source);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("Nesting too deep"));
    assert_eq!(program.statements.len(), 1);

    let mut compiler = ChtlJsCompiler::new();
    assert!(compiler.compile(&source).contains("var b = 2;"));
    assert!(compiler.has_errors());
}

#[test]
fn long_unary_chains_are_bounded_too() {
    let source = format!("x = {}a;", "!".repeat(5000));
    let (_, errors) = parse(&source);
    assert!(errors.iter().any(|e| e.to_string().contains("Nesting too deep")));
}

#[test]
fn ordinary_nesting_still_parses() {
    let source = format!("var a = {}1{};", "(".repeat(40), ")".repeat(40));
    let (_, errors) = parse(&source);
    assert!(errors.is_empty(), "{:?}", errors);
}

// ── Ordering ────────────────────────────────────────────────────────────

#[test]
fn errors_are_sorted_by_position() {
    let (_, errors) = parse("var = 1;\n@\nlet = 2;");
    let lines: Vec<usize> = errors
        .iter()
        .map(|e| match e {
            CompileError::Lexical(l) => l.line,
            CompileError::Parse { line, .. } => *line,
            CompileError::Validation(_) => 0,
        })
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
}
