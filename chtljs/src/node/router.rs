use super::omission;
use crate::text::{indent, quote};

/// Global the generated code exposes its router on.
pub const ROUTER_GLOBAL: &str = "chtljsRouter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Exact path, or a pattern where `*` matches anything.
    pub url: String,
    /// Elements revealed when the route is active.
    pub selector: String,
    /// Function expression called with the path on activation.
    pub handler: Option<String>,
}

impl Route {
    pub fn new(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            handler: None,
        }
    }
}

/// Client-side router. Route order is match priority.
#[derive(Debug, Clone)]
pub struct Router {
    /// `"hash"` or `"history"`.
    pub mode: String,
    /// Root container selector; empty means `document.body`.
    pub root: String,
    pub routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            mode: "hash".to_string(),
            root: String::new(),
            routes: Vec::new(),
        }
    }
}

const ROUTER_RUNTIME: &str = r#"getPath: function() {
    if (this.mode === 'history') {
        return window.location.pathname;
    }
    return window.location.hash.replace(/^#/, '') || '/';
},
match: function(path) {
    for (var i = 0; i < this.routes.length; i++) {
        if (this.routes[i].url === path) {
            return this.routes[i];
        }
    }
    for (var j = 0; j < this.routes.length; j++) {
        var url = this.routes[j].url;
        if (url.indexOf('*') !== -1 && new RegExp('^' + url.replace(/\*/g, '.*') + '$').test(path)) {
            return this.routes[j];
        }
    }
    return null;
},
switchTo: function(route, path) {
    var root = this.rootElement || document.body;
    for (var i = 0; i < root.children.length; i++) {
        root.children[i].style.display = 'none';
    }
    if (route.selector) {
        var shown = document.querySelectorAll(route.selector);
        for (var j = 0; j < shown.length; j++) {
            shown[j].style.display = '';
        }
    }
    this.currentRoute = route;
    if (typeof route.handler === 'function') {
        route.handler(path);
    }
},
dispatch: function() {
    var path = this.getPath();
    var route = this.match(path);
    if (route) {
        this.switchTo(route, path);
    }
},
navigate: function(path) {
    if (this.mode === 'history') {
        window.history.pushState({}, '', path);
        this.dispatch();
    } else {
        window.location.hash = path;
    }
},
getCurrentRoute: function() {
    return this.currentRoute;
},
getRoutes: function() {
    return this.routes.slice();
},
init: function() {
    var self = this;
    this.initialized = true;
    this.rootElement = this.root ? document.querySelector(this.root) : document.body;
    window.addEventListener(this.mode === 'history' ? 'popstate' : 'hashchange', function() {
        self.dispatch();
    });
    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', function() {
            self.dispatch();
        });
    } else {
        this.dispatch();
    }
}"#;

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Creates the page router on first use, appends this node's routes in
    /// order and initializes it. A router that is already running and has not
    /// matched anything yet dispatches again, since the new routes may match.
    pub fn to_javascript(&self) -> String {
        if self.routes.is_empty() {
            return omission("router", "no routes");
        }
        let mode = if self.mode == "history" { "history" } else { "hash" };
        let routes = self
            .routes
            .iter()
            .map(|r| {
                format!(
                    "{{ url: {}, selector: {}, handler: {} }}",
                    quote(&r.url),
                    quote(&r.selector),
                    r.handler.as_deref().unwrap_or("null")
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");

        let mut out = String::new();
        out.push_str("(function() {\n");
        out.push_str(&format!("    var router = window.{};\n", ROUTER_GLOBAL));
        out.push_str("    if (!router) {\n");
        out.push_str(&format!("        router = window.{} = {{\n", ROUTER_GLOBAL));
        out.push_str(&format!("            mode: {},\n", quote(mode)));
        out.push_str(&format!("            root: {},\n", quote(&self.root)));
        out.push_str("            routes: [],\n");
        out.push_str("            currentRoute: null,\n");
        out.push_str("            rootElement: null,\n");
        out.push_str("            initialized: false,\n");
        out.push_str(&indent(ROUTER_RUNTIME, 3));
        out.push_str("\n        };\n");
        out.push_str("    }\n");
        out.push_str("    router.routes.push(\n");
        out.push_str(&indent(&routes, 2));
        out.push_str("\n    );\n");
        out.push_str("    if (!router.initialized) {\n");
        out.push_str("        router.init();\n");
        out.push_str("    } else if (!router.currentRoute && document.readyState !== 'loading') {\n");
        out.push_str("        router.dispatch();\n");
        out.push_str("    }\n");
        out.push_str("})();");
        out
    }
}
