use chtljs::backend::optimize::{optimize, PassManager};
use chtljs::compile_to_js;
use chtljs::node::{
    Animate, Delegate, EnhancedSelector, FileLoader, Keyframe, Listen, Node, Route, Router, Vir,
};
use chtljs::CompileOptions;

// ── Enhanced selectors ──────────────────────────────────────────────────

#[test]
fn selector_queries() {
    assert_eq!(
        EnhancedSelector::new(".box").to_javascript(),
        "document.querySelector('.box')"
    );
    assert_eq!(
        EnhancedSelector::new("button[2]").to_javascript(),
        "document.querySelectorAll('button')[2]"
    );
    assert_eq!(
        EnhancedSelector::new(" #app ").to_javascript(),
        "document.querySelector('#app')"
    );
}

#[test]
fn selector_with_non_numeric_brackets_is_a_plain_query() {
    let sel = EnhancedSelector::new("input[type=text]");
    assert!(sel.is_indexed());
    assert_eq!(sel.index(), -1);
    assert_eq!(sel.to_javascript(), "document.querySelector('input[type=text]')");
    assert_eq!(
        Node::from(sel).warnings(),
        vec!["selector 'input[type=text]' has brackets but no integer index; using querySelector"]
    );
}

#[test]
fn empty_selector_lowers_to_null() {
    assert!(EnhancedSelector::new("").to_javascript().starts_with("null"));
}

// ── listen ──────────────────────────────────────────────────────────────

#[test]
fn listen_lines_follow_registration_order() {
    let mut listen = Listen::new();
    listen.add_event("click", "f");
    listen.add_event("keyup", "g");
    listen.add_event("click", "h");
    assert_eq!(
        listen.to_javascript(),
        "element.addEventListener('click', h);\nelement.addEventListener('keyup', g);"
    );
}

#[test]
fn listen_without_events_is_a_comment() {
    assert_eq!(Listen::new().to_javascript(), "// CHTL JS listen: no listeners");
}

// ── delegate ────────────────────────────────────────────────────────────

#[test]
fn delegate_registers_in_the_shared_registry() {
    let mut delegate = Delegate::new();
    delegate.add_target(".item");
    delegate.add_target(".other");
    delegate.add_event("click", "onClick");
    let js = delegate.to_javascript();
    assert!(js.contains(
        "var registry = window.__chtljsDelegationRegistry = window.__chtljsDelegationRegistry || {};"
    ));
    assert!(js.contains("'click': onClick"));
    assert!(js.contains("['.item', '.other'].forEach(function(selector) {"));
    assert!(js.contains("record = registry[selector] = { parent: document, events: {} };"));
    assert!(js.contains("record.parent.addEventListener('click', function(event) {"));
    assert!(js.contains("handler.call(target, event);"));
}

#[test]
fn delegate_parent_falls_back_to_document() {
    let mut delegate = Delegate::new();
    delegate.set_parent("#list");
    delegate.add_target("li");
    delegate.add_event("click", "pick");
    assert!(delegate
        .to_javascript()
        .contains("parent: document.querySelector('#list') || document"));
}

#[test]
fn delegate_native_listener_uses_the_first_event() {
    let mut delegate = Delegate::new();
    delegate.add_target("li");
    delegate.add_event("mouseover", "a");
    delegate.add_event("click", "b");
    let js = delegate.to_javascript();
    assert!(js.contains("addEventListener('mouseover'"));
    assert!(!js.contains("addEventListener('click'"));
    assert_eq!(
        Node::from(delegate).warnings(),
        vec!["delegate binds a native listener only for 'mouseover' on first registration"]
    );
}

#[test]
fn delegate_without_targets_or_events_is_a_comment() {
    let mut no_events = Delegate::new();
    no_events.add_target("li");
    assert_eq!(no_events.to_javascript(), "// CHTL JS delegate: no delegation");

    let mut no_targets = Delegate::new();
    no_targets.add_event("click", "f");
    assert_eq!(no_targets.to_javascript(), "// CHTL JS delegate: no delegation");
}

// ── animate ─────────────────────────────────────────────────────────────

#[test]
fn animate_descriptor_and_driver() {
    let mut animate = Animate::new(".box");
    animate.duration = 300;
    animate.easing = "linear".to_string();
    animate.loop_count = -1;
    animate.begin.insert("opacity".to_string(), "0".to_string());
    animate.keyframes.push(Keyframe {
        at: 0.5,
        properties: [("opacity".to_string(), "0.5".to_string())].into_iter().collect(),
    });
    let js = animate.to_javascript();
    assert!(js.starts_with("(function() {\n    var target = document.querySelector('.box');\n"));
    assert!(js.contains("duration: 300,"));
    assert!(js.contains("easing: 'linear',"));
    assert!(js.contains("loop: -1,"));
    assert!(js.contains("direction: 'normal',"));
    assert!(js.contains("begin: {\n"));
    assert!(js.contains("{ at: 0.5, properties: {"));
    assert!(js.contains("end: {},"));
    assert!(js.contains("callback: null"));
    assert!(js.contains("requestAnimationFrame(frame);"));
    assert!(js.ends_with("})();"));
}

#[test]
fn animate_knows_the_standard_easings() {
    let js = Animate::new(".box").to_javascript();
    assert!(js.contains("'ease-in': function(t) { return t * t; }"));
    assert!(js.contains("'ease-out': function(t) { return 1 - (1 - t) * (1 - t); }"));
    assert!(js.contains("'ease-in-out': function(t) { return t < 0.5 ? 2 * t * t : 1 - Math.pow(-2 * t + 2, 2) / 2; }"));
    assert!(js.contains("var ease = easings[animation.easing] || function(t) { return t; };"));
}

#[test]
fn animate_without_target_is_a_comment() {
    assert_eq!(
        Animate::default().to_javascript(),
        "// CHTL JS animate: missing target selector"
    );
}

#[test]
fn keyframes_outside_the_timeline_warn() {
    let mut animate = Animate::new(".box");
    animate.keyframes.push(Keyframe {
        at: 1.5,
        ..Keyframe::default()
    });
    assert_eq!(
        Node::from(animate).warnings(),
        vec!["keyframe at 1.5 lies outside [0, 1]"]
    );
}

// ── vir ─────────────────────────────────────────────────────────────────

#[test]
fn vir_object_and_accessor() {
    let mut vir = Vir::new("box");
    vir.add_property("color", "'red'");
    vir.add_property("font-size", "12");
    assert_eq!(vir.accessor_name(), "getBoxProperty");
    assert_eq!(
        vir.to_javascript(),
        "const box = {\n    color: 'red',\n    'font-size': 12\n};\n\
         function getBoxProperty(property) {\n    \
         if (Object.prototype.hasOwnProperty.call(box, property)) {\n        \
         return box[property];\n    \
         }\n    \
         return undefined;\n\
         }"
    );
}

#[test]
fn vir_without_properties_is_an_empty_object() {
    assert!(Vir::new("empty").to_javascript().starts_with("const empty = {};\n"));
    assert_eq!(Vir::new("").to_javascript(), "// CHTL JS vir: missing object name");
}

// ── router ──────────────────────────────────────────────────────────────

#[test]
fn router_registers_routes_in_order() {
    let mut router = Router::new();
    router.root = "#app".to_string();
    router.add_route(Route::new("/", "#home"));
    let mut user = Route::new("/user/*", "#user");
    user.handler = Some("show".to_string());
    router.add_route(user);
    let js = router.to_javascript();
    assert!(js.contains("var router = window.chtljsRouter;"));
    assert!(js.contains("mode: 'hash',"));
    assert!(js.contains("root: '#app',"));
    let home = js.find("{ url: '/', selector: '#home', handler: null }");
    let user = js.find("{ url: '/user/*', selector: '#user', handler: show }");
    assert!(home.is_some() && user.is_some() && home < user);
    assert!(js.contains("router.init();"));
}

#[test]
fn router_matches_exact_urls_before_wildcards() {
    let mut router = Router::new();
    router.add_route(Route::new("/*", "#any"));
    let js = router.to_javascript();
    let exact = js.find("if (this.routes[i].url === path) {");
    let wildcard = js.find("new RegExp('^' + url.replace(/\\*/g, '.*') + '$').test(path)");
    assert!(exact.is_some() && wildcard.is_some() && exact < wildcard);
}

#[test]
fn history_mode_listens_for_popstate() {
    let mut router = Router::new();
    router.mode = "history".to_string();
    router.add_route(Route::new("/", ""));
    let js = router.to_javascript();
    assert!(js.contains("mode: 'history',"));
    assert!(js.contains("window.history.pushState({}, '', path);"));
    assert!(js.contains("this.mode === 'history' ? 'popstate' : 'hashchange'"));
}

#[test]
fn later_routes_redispatch_a_running_router() {
    let mut router = Router::new();
    router.add_route(Route::new("/user/*", "#user"));
    let js = router.to_javascript();
    let push = js.find("router.routes.push(");
    let redispatch = js.find(
        "    if (!router.initialized) {\n        \
         router.init();\n    \
         } else if (!router.currentRoute && document.readyState !== 'loading') {\n        \
         router.dispatch();\n    \
         }\n",
    );
    assert!(push.is_some() && redispatch.is_some() && push < redispatch);
}

#[test]
fn router_without_routes_is_a_comment() {
    assert_eq!(Router::new().to_javascript(), "// CHTL JS router: no routes");
}

// ── fileloader ──────────────────────────────────────────────────────────

#[test]
fn fileloader_module_definition() {
    let mut loader = FileLoader::new();
    loader.add_file("a.js");
    loader.add_file("b.js");
    assert_eq!(
        loader.to_javascript(),
        "// fileloader: load order 1) a.js, 2) b.js\n\
         define(['a.js', 'b.js'], function() {\n    \
         var exports = {};\n    \
         return exports;\n\
         });"
    );
}

#[test]
fn fileloader_body_goes_inside_the_factory() {
    assert_eq!(
        compile_to_js("fileloader('a.js') { init(); }").unwrap_or_default(),
        "// fileloader: load order 1) a.js\n\
         define(['a.js'], function() {\n    \
         var exports = {};\n    \
         init();\n    \
         return exports;\n\
         });"
    );
}

#[test]
fn fileloader_without_files_is_a_comment() {
    assert_eq!(
        FileLoader::new().to_javascript(),
        "// CHTL JS fileloader: no files to load"
    );
}

// ── Statement lowering ──────────────────────────────────────────────────

#[test]
fn listen_statement_is_bound_to_its_element() {
    assert_eq!(
        compile_to_js("listen('.btn', 'click', go);").unwrap_or_default(),
        "(function(element) {\n    \
         if (!element) {\n        \
         return;\n    \
         }\n    \
         element.addEventListener('click', go);\n\
         })(document.querySelector('.btn'));"
    );
}

#[test]
fn util_polls_its_condition() {
    let js = compile_to_js("util count > 3 change { log('changed'); } then { alert('big'); }")
        .unwrap_or_default();
    assert!(js.starts_with("(function() {\n    function handleChange() {\n        log('changed');\n    }\n"));
    assert!(js.contains("    function handleThen() {\n        alert('big');\n    }\n"));
    assert!(js.contains("    var previousValue = count > 3;\n"));
    assert!(js.contains("        var currentValue = count > 3;\n"));
    assert!(js.contains("            handleChange();\n            if (currentValue) {\n                handleThen();\n"));
    assert!(js.contains("        previousValue = currentValue;\n"));
    assert!(js.ends_with("    setInterval(checkCondition, 100);\n})();"));
}

#[test]
fn util_without_change_branch_has_an_empty_handler() {
    let js = compile_to_js("util ready then start();").unwrap_or_default();
    assert!(js.contains("    function handleChange() {\n    }\n"));
    assert!(js.contains("    function handleThen() {\n        start();\n    }\n"));
}

// ── Text passes ─────────────────────────────────────────────────────────

#[test]
fn pipeline_grows_with_the_level() {
    let defaults = CompileOptions::default();
    assert!(PassManager::for_level(0, &defaults).pass_names().is_empty());
    assert_eq!(PassManager::for_level(1, &defaults).pass_names(), vec!["clean"]);
    assert_eq!(
        PassManager::for_level(3, &defaults).pass_names(),
        vec!["clean", "optimize"]
    );

    let mut minify = CompileOptions::default();
    minify.set("minify", "true");
    assert_eq!(
        PassManager::for_level(3, &minify).pass_names(),
        vec!["clean", "optimize", "minify"]
    );
}

#[test]
fn blank_line_pass_collapses_runs() {
    let options = CompileOptions::default();
    assert_eq!(optimize("a;   \n\n\n\nb;\n", 2, &options), "a;\n\nb;\n");
    assert_eq!(optimize("\u{feff}a;\r\nb;", 1, &options), "a;\nb;");
}
