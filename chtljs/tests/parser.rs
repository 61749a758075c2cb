use chtljs::ast::{Expr, Stmt};
use chtljs::node::{Node, NodeKind};
use chtljs::{compile_to_js, parse};

fn js(source: &str) -> String {
    compile_to_js(source).unwrap_or_else(|e| panic!("{} failed: {}", source, e))
}

/// The single CHTL JS node a one-statement program parses to.
fn only_node(source: &str) -> Node {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    assert_eq!(program.statements.len(), 1);
    match program.statements.into_iter().next() {
        Some(Stmt::Chtl { node, .. }) => node,
        other => panic!("expected a CHTL JS statement, got {:?}", other),
    }
}

// ── Expressions ─────────────────────────────────────────────────────────

#[test]
fn grouping_survives_lowering() {
    assert_eq!(js("var a = (1 + 2) * 3;"), "var a = (1 + 2) * 3;");
    assert_eq!(js("var b = 1 + 2 * 3;"), "var b = 1 + 2 * 3;");
    assert_eq!(js("var c = a - (b - c);"), "var c = a - (b - c);");
}

#[test]
fn exponent_is_right_associative() {
    assert_eq!(js("y = 2 ** 3 ** 2;"), "y = 2 ** 3 ** 2;");
    assert_eq!(js("y = (2 ** 3) ** 2;"), "y = (2 ** 3) ** 2;");
}

#[test]
fn logical_and_bitwise_levels() {
    assert_eq!(js("r = a || b && c;"), "r = a || b && c;");
    assert_eq!(js("r = (a || b) && c;"), "r = (a || b) && c;");
    assert_eq!(js("r = a | b ^ c & d;"), "r = a | b ^ c & d;");
    assert_eq!(js("r = a < b == c > d;"), "r = a < b == c > d;");
}

#[test]
fn nullish_is_parenthesized_next_to_logical_operators() {
    assert_eq!(js("x = (a && b) ?? c;"), "x = (a && b) ?? c;");
}

#[test]
fn unary_and_update_operators() {
    assert_eq!(js("y = - -x;"), "y = - -x;");
    assert_eq!(js("z = !a && typeof b === 'string';"), "z = !a && typeof b === 'string';");
    assert_eq!(js("i++;\n--j;"), "i++;\n--j;");
}

#[test]
fn postfix_update_does_not_cross_a_newline() {
    assert_eq!(js("a\n++b"), "a;\n++b;");
}

#[test]
fn conditional_and_assignment_chain() {
    assert_eq!(js("a = b = c ? 1 : 2;"), "a = b = c ? 1 : 2;");
    assert_eq!(js("total += price * qty;"), "total += price * qty;");
}

#[test]
fn new_with_member_call() {
    assert_eq!(js("var t = new Date().getTime();"), "var t = new Date().getTime();");
    assert_eq!(js("var m = new Map;"), "var m = new Map();");
}

#[test]
fn arrows() {
    assert_eq!(js("var f = (a, b = 2) => a + b;"), "var f = (a, b = 2) => a + b;");
    assert_eq!(js("var g = x => ({ v: x });"), "var g = x => ({ v: x });");
    assert_eq!(
        js("items.forEach(item => { use(item); });"),
        "items.forEach(item => {\n    use(item);\n});"
    );
}

#[test]
fn immediately_invoked_function_keeps_its_parentheses() {
    assert_eq!(
        js("(function() { go(); })();"),
        "(function() {\n    go();\n})();"
    );
}

#[test]
fn object_and_array_literals() {
    assert_eq!(
        js("var o = { a: 1, 'b-c': [1, 2], d, ...rest };"),
        "var o = { a: 1, 'b-c': [1, 2], d, ...rest };"
    );
    assert_eq!(js("var e = {};"), "var e = {};");
}

#[test]
fn selector_member_access() {
    assert_eq!(
        js("{{.box}}->textContent = 'x';"),
        "document.querySelector('.box').textContent = 'x';"
    );
    assert_eq!(
        js("{{button[2]}}.click();"),
        "document.querySelectorAll('button')[2].click();"
    );
}

#[test]
fn regex_literals_pass_through() {
    assert_eq!(
        js("var p = hash.replace(/^#/, '');"),
        "var p = hash.replace(/^#/, '');"
    );
    assert_eq!(js("ok = /[a-z]+/i.test(name);"), "ok = /[a-z]+/i.test(name);");
    assert_eq!(js("r = a / b / 2;"), "r = a / b / 2;");
}

// ── Statements ──────────────────────────────────────────────────────────

#[test]
fn classic_for_loop() {
    assert_eq!(
        js("for (let i = 0; i < 3; i++) { sum += i; }"),
        "for (let i = 0; i < 3; i++) {\n    sum += i;\n}"
    );
}

#[test]
fn for_of_and_for_in() {
    assert_eq!(
        js("for (const item of items) { use(item); }"),
        "for (const item of items) {\n    use(item);\n}"
    );
    assert_eq!(js("for (k in obj) log(k);"), "for (k in obj) {\n    log(k);\n}");
}

#[test]
fn if_else_chain() {
    assert_eq!(
        js("if (a) b(); else if (c) d(); else e();"),
        "if (a) {\n    b();\n} else if (c) {\n    d();\n} else {\n    e();\n}"
    );
}

#[test]
fn while_and_do_while() {
    assert_eq!(js("while (n > 0) n--;"), "while (n > 0) {\n    n--;\n}");
    assert_eq!(js("do { step(); } while (busy);"), "do {\n    step();\n} while (busy);");
}

#[test]
fn switch_arms_are_indented() {
    assert_eq!(
        js("switch (k) { case 1: a(); break; default: b(); }"),
        "switch (k) {\n    case 1:\n        a();\n        break;\n    default:\n        b();\n}"
    );
}

#[test]
fn try_catch_finally() {
    assert_eq!(
        js("try { a(); } catch (e) { b(e); } finally { c(); }"),
        "try {\n    a();\n} catch (e) {\n    b(e);\n} finally {\n    c();\n}"
    );
}

#[test]
fn function_declaration() {
    assert_eq!(
        js("function add(a, ...rest) { return a + rest.length; }"),
        "function add(a, ...rest) {\n    return a + rest.length;\n}"
    );
}

#[test]
fn labels_and_bare_jumps() {
    assert_eq!(
        js("while (true) { continue outer; break; }"),
        "while (true) {\n    continue outer;\n    break;\n}"
    );
}

#[test]
fn newline_inserts_semicolons() {
    assert_eq!(js("var a = 1\nvar b = 2"), "var a = 1;\nvar b = 2;");
    assert_eq!(js("function f() { return }"), "function f() {\n    return;\n}");
}

// ── Error recovery ──────────────────────────────────────────────────────

#[test]
fn recovery_keeps_the_good_statements() {
    let (program, errors) = parse("var = 1;\nvar ok = 2;\nlet = ;\nvar fine = 3;");
    assert_eq!(errors.len(), 2);
    assert_eq!(program.statements.len(), 2);
    assert_eq!(program.statements[1].location().line, 4);
}

#[test]
fn bad_statement_inside_block_does_not_end_the_block() {
    let (program, errors) = parse("function f() {\n    var = 1;\n    go();\n}\nafter();");
    assert_eq!(errors.len(), 1);
    assert_eq!(program.statements.len(), 2);
    match &program.statements[0] {
        Stmt::Function { def, .. } => assert_eq!(def.body.len(), 1),
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn missing_semicolon_on_one_line() {
    let (_, errors) = parse("a = 1 b = 2");
    assert!(errors[0].to_string().contains("Expected ';' after statement"));
}

#[test]
fn const_requires_an_initializer() {
    let (program, errors) = parse("const x;");
    assert_eq!(program.statements.len(), 1);
    assert!(errors[0].to_string().contains("Missing initializer in const 'x'"));
}

#[test]
fn invalid_assignment_target() {
    let (_, errors) = parse("1 = 2;");
    assert!(errors[0].to_string().contains("Invalid assignment target"));
}

// ── listen ──────────────────────────────────────────────────────────────

#[test]
fn listen_with_event_map() {
    let node = only_node("listen({{.btn}}, { click: onClick, mouseenter: () => hover() });");
    assert_eq!(node.attribute("target"), Some(".btn"));
    assert_eq!(node.attributes().len(), 1);
    let NodeKind::Listen(listen) = &node.kind else {
        panic!("expected listen");
    };
    let events: Vec<(&str, &str)> = listen
        .events()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        events,
        vec![("click", "onClick"), ("mouseenter", "() => hover()")]
    );
}

#[test]
fn listen_with_event_name_and_default_event() {
    let node = only_node("listen('.a', 'keyup', handle);");
    let NodeKind::Listen(listen) = &node.kind else {
        panic!("expected listen");
    };
    assert_eq!(listen.events().get("keyup").map(String::as_str), Some("handle"));

    let node = only_node("listen('.a', go);");
    let NodeKind::Listen(listen) = &node.kind else {
        panic!("expected listen");
    };
    assert_eq!(listen.events().get("click").map(String::as_str), Some("go"));
}

#[test]
fn arrow_listen_takes_the_selector_as_target() {
    let (program, errors) = parse("{{#menu}}->listen({ click: toggle });");
    assert!(errors.is_empty());
    match &program.statements[0] {
        Stmt::Chtl { node, target, .. } => {
            assert_eq!(node.kind.name(), "listen");
            assert_eq!(node.attribute("target"), Some("#menu"));
            assert!(matches!(target, Some(Expr::Selector(_))));
        }
        other => panic!("expected listen, got {:?}", other),
    }
}

// ── delegate ────────────────────────────────────────────────────────────

#[test]
fn arrow_delegate_sets_the_parent() {
    let node = only_node("{{#list}}->delegate('li', 'click', pick);");
    let NodeKind::Delegate(delegate) = &node.kind else {
        panic!("expected delegate");
    };
    assert_eq!(delegate.parent(), Some("#list"));
    assert_eq!(delegate.targets(), ["li".to_string()]);
    assert_eq!(delegate.events().get("click").map(String::as_str), Some("pick"));
}

#[test]
fn delegate_with_target_array() {
    let node = only_node("delegate(['.a', {{.b}}], { click: f, mouseover: g });");
    let NodeKind::Delegate(delegate) = &node.kind else {
        panic!("expected delegate");
    };
    assert_eq!(delegate.parent(), None);
    assert_eq!(delegate.targets(), [".a".to_string(), ".b".to_string()]);
    assert_eq!(delegate.events().len(), 2);
}

#[test]
fn delegate_object_form() {
    let node = only_node("delegate({ target: {{.row}}, click: select });");
    let NodeKind::Delegate(delegate) = &node.kind else {
        panic!("expected delegate");
    };
    assert_eq!(delegate.targets(), [".row".to_string()]);
    assert_eq!(delegate.events().keys().collect::<Vec<_>>(), vec!["click"]);
}

// ── animate ─────────────────────────────────────────────────────────────

#[test]
fn animate_options() {
    let node = only_node(
        "animate({
            target: {{.box}},
            duration: 500,
            easing: 'ease-in',
            loop: -1,
            delay: 0x10,
            direction: 'alternate',
            begin: { opacity: 0 },
            when: [{ at: 0.5, opacity: 0.5 }],
            end: { opacity: 1 },
            callback: done
        });",
    );
    let NodeKind::Animate(animate) = &node.kind else {
        panic!("expected animate");
    };
    assert_eq!(animate.target, ".box");
    assert_eq!(animate.duration, 500);
    assert_eq!(animate.easing, "ease-in");
    assert_eq!(animate.loop_count, -1);
    assert_eq!(animate.delay, 16);
    assert_eq!(animate.direction, "alternate");
    assert_eq!(animate.begin.get("opacity").map(String::as_str), Some("0"));
    assert_eq!(animate.keyframes.len(), 1);
    assert_eq!(animate.keyframes[0].at, 0.5);
    assert!(!animate.keyframes[0].properties.contains_key("at"));
    assert_eq!(animate.end.get("opacity").map(String::as_str), Some("1"));
    assert_eq!(animate.callback.as_deref(), Some("done"));
}

#[test]
fn animate_defaults_and_arrow_target() {
    let node = only_node("{{.card}}->animate({ duration: 200 });");
    let NodeKind::Animate(animate) = &node.kind else {
        panic!("expected animate");
    };
    assert_eq!(animate.target, ".card");
    assert_eq!(animate.duration, 200);
    assert_eq!(animate.easing, "ease-in-out");
    assert_eq!(animate.loop_count, 1);
    assert_eq!(animate.direction, "normal");
}

// ── vir ─────────────────────────────────────────────────────────────────

#[test]
fn vir_declaration_forms() {
    for source in [
        "vir Box = { color: 'red', size: 10 };",
        "vir Box = iNeverAway { color: 'red', size: 10 };",
        "vir Box = [iNeverAway] { color: 'red', size: 10 };",
    ] {
        let node = only_node(source);
        let NodeKind::Vir(vir) = &node.kind else {
            panic!("expected vir for {}", source);
        };
        assert_eq!(vir.name(), "Box");
        assert_eq!(vir.properties().get("color").map(String::as_str), Some("'red'"));
        assert_eq!(vir.properties().get("size").map(String::as_str), Some("10"));
    }
}

#[test]
fn vir_from_selector() {
    let node = only_node("vir({{.main-box}});");
    let NodeKind::Vir(vir) = &node.kind else {
        panic!("expected vir");
    };
    assert_eq!(vir.name(), "main_box");
    assert_eq!(
        vir.properties().get("element").map(String::as_str),
        Some("document.querySelector('.main-box')")
    );
}

// ── router ──────────────────────────────────────────────────────────────

#[test]
fn router_object_form() {
    let node = only_node(
        "router({
            mode: 'history',
            root: '#app',
            routes: [
                { url: '/', page: {{#home}} },
                { url: '/user/*', page: '#user', handler: show }
            ]
        });",
    );
    let NodeKind::Router(router) = &node.kind else {
        panic!("expected router");
    };
    assert_eq!(router.mode, "history");
    assert_eq!(router.root, "#app");
    assert_eq!(router.routes.len(), 2);
    assert_eq!(router.routes[0].url, "/");
    assert_eq!(router.routes[0].selector, "#home");
    assert_eq!(router.routes[1].handler.as_deref(), Some("show"));
}

#[test]
fn router_single_route_forms() {
    let node = only_node("router('/about', {{#about}}, function(path) { log(path); });");
    let NodeKind::Router(router) = &node.kind else {
        panic!("expected router");
    };
    assert_eq!(router.mode, "hash");
    assert_eq!(router.routes[0].url, "/about");
    assert_eq!(router.routes[0].selector, "#about");
    assert_eq!(
        router.routes[0].handler.as_deref(),
        Some("function(path) {\n    log(path);\n}")
    );

    let node = only_node("router({ url: '/x', page: '#x' });");
    let NodeKind::Router(router) = &node.kind else {
        panic!("expected router");
    };
    assert_eq!(router.routes.len(), 1);
}

// ── util ────────────────────────────────────────────────────────────────

#[test]
fn util_with_change_and_then() {
    let (program, errors) =
        parse("util count > 3 change { log('changed'); } then { alert('big'); }");
    assert!(errors.is_empty(), "{:?}", errors);
    match &program.statements[0] {
        Stmt::Util {
            on_change, then, ..
        } => {
            assert!(on_change.is_some());
            assert!(matches!(then.as_ref(), Stmt::Block { .. }));
        }
        other => panic!("expected util, got {:?}", other),
    }
}

#[test]
fn util_with_expression_branch() {
    let (program, errors) = parse("util ready then start();\nnext();");
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(
        &program.statements[0],
        Stmt::Util { on_change: None, .. }
    ));
}

#[test]
fn util_as_plain_name() {
    assert_eq!(js("util.run();"), "util.run();");
    assert_eq!(js("util = 1;"), "util = 1;");
}

// ── fileloader ──────────────────────────────────────────────────────────

#[test]
fn fileloader_argument_form_with_body() {
    let (program, errors) = parse("fileloader('a.js', 'b.js') { init(); }");
    assert!(errors.is_empty());
    match &program.statements[0] {
        Stmt::Chtl { node, body, .. } => {
            let NodeKind::FileLoader(loader) = &node.kind else {
                panic!("expected fileloader");
            };
            assert_eq!(loader.files(), ["a.js".to_string(), "b.js".to_string()]);
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected fileloader, got {:?}", other),
    }
}

#[test]
fn fileloader_object_form() {
    let node = only_node("fileloader { main: 'x.js', extra: 'y.js' }");
    let NodeKind::FileLoader(loader) = &node.kind else {
        panic!("expected fileloader");
    };
    assert_eq!(loader.files(), ["x.js".to_string(), "y.js".to_string()]);
}

// ── Traversal ───────────────────────────────────────────────────────────

#[test]
fn chtl_refs_find_nested_nodes_and_selectors() {
    let (program, errors) = parse(
        "var a = {{.a}};\nfunction f() {\n    listen({{.b}}, go);\n}\nif (x) { vir({{#c}}); }",
    );
    assert!(errors.is_empty(), "{:?}", errors);
    let refs = program.chtl_refs();
    assert_eq!(refs.nodes.len(), 2);
    let selectors: Vec<&str> = refs.selectors.iter().map(|s| s.selector()).collect();
    assert_eq!(selectors, vec![".a", ".b"]);
}
