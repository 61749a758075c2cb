//! CHTL JS statement forms: `fileloader`, `listen`, `delegate`, `animate`,
//! `vir`, `router` and `util`, plus the `{{selector}}->form(...)` spelling.

use super::{ParseResult, Parser};
use crate::ast::{Expr, Property, Stmt, UnOp};
use crate::backend::codegen::expr_to_js;
use crate::frontend::lexer::Token;
use crate::node::{
    Animate, Delegate, EnhancedSelector, FileLoader, Keyframe, Listen, Node, NodeKind, Route,
    Router, Vir,
};
use crate::SourceLocation;
use indexmap::IndexMap;

/// Event used by `listen(target, handler)` when none is named.
const DEFAULT_EVENT: &str = "click";

/// Selector text of a `{{selector}}` or string literal argument.
fn selector_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Selector(sel) => Some(sel.selector().to_string()),
        Expr::Str(_) => expr.as_string_literal(),
        _ => None,
    }
}

/// Numeric value of a literal, allowing a leading minus.
fn number_value(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Number(text) => {
            let lower = text.to_ascii_lowercase();
            match lower.strip_prefix("0x") {
                Some(hex) => i64::from_str_radix(hex, 16).ok().map(|v| v as f64),
                None => lower.parse().ok(),
            }
        }
        Expr::Unary {
            op: UnOp::Neg,
            operand,
        } => number_value(operand).map(|v| -v),
        _ => None,
    }
}

/// Plain-key entries of an object literal, values lowered to JavaScript.
fn object_entries(props: &[Property]) -> Vec<(String, &Expr)> {
    props
        .iter()
        .filter_map(|p| match p {
            Property::KeyValue { key, value } => key.name().map(|k| (k, value)),
            _ => None,
        })
        .collect()
}

fn property_map(props: &[Property]) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for prop in props {
        match prop {
            Property::KeyValue { key, value } => {
                if let Some(name) = key.name() {
                    map.insert(name, expr_to_js(value));
                }
            }
            Property::Shorthand(name) => {
                map.insert(name.clone(), name.clone());
            }
            Property::Spread(_) => {}
        }
    }
    map
}

/// Identifier derived from a selector, e.g. `.main-box` becomes `main_box`.
fn vir_name_from_selector(selector: &str) -> String {
    let sanitized: String = selector
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    let trimmed = sanitized.trim_matches('_');
    match trimmed.chars().next() {
        Some(c) if !c.is_ascii_digit() => trimmed.to_string(),
        _ => format!("vir_{}", trimmed),
    }
}

fn chtl_node(payload: impl Into<NodeKind>, loc: SourceLocation) -> Node {
    Node::new(payload.into(), loc)
}

impl<'src> Parser<'src> {
    /// `{{sel}}->listen(...)`, `{{sel}}->delegate(...)`, `{{sel}}->animate(...)`.
    /// Rewinds and yields `None` for any other use of a leading selector.
    pub(crate) fn try_selector_arrow(&mut self) -> ParseResult<Option<Stmt>> {
        let start = self.pos;
        let reported = self.errors.len();
        let spans = self.selector_spans.len();
        let loc = self.location();

        let Ok(selector) = self.parse_selector() else {
            self.pos = start;
            self.errors.truncate(reported);
            self.selector_spans.truncate(spans);
            return Ok(None);
        };
        let form = match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some(Token::Arrow), Some(kw), Some(Token::LParen))
                if matches!(kw, Token::Listen | Token::Delegate | Token::Animate) =>
            {
                kw.clone()
            }
            _ => {
                self.pos = start;
                self.errors.truncate(reported);
                self.selector_spans.truncate(spans);
                return Ok(None);
            }
        };
        self.bump();
        log::trace!("arrow form {} on {{{{{}}}}} at {}", form, selector.selector(), loc);
        let stmt = match form {
            Token::Listen => self.parse_listen(Some(Expr::Selector(selector)))?,
            Token::Delegate => self.parse_delegate(Some(selector))?,
            _ => self.parse_animate(Some(selector))?,
        };
        Ok(Some(match stmt {
            Stmt::Chtl {
                mut node,
                target,
                body,
            } => {
                node.location = loc;
                Stmt::Chtl { node, target, body }
            }
            other => other,
        }))
    }

    /// `fileloader('a.js', 'b.js') { body }` or `fileloader { load: 'a.js', ... }`
    pub(crate) fn parse_file_loader(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::FileLoader, "'fileloader'")?;
        let mut loader = FileLoader::new();
        let mut body = Vec::new();

        if self.check(&Token::LBrace) {
            for prop in self.parse_object()? {
                let path = match &prop {
                    Property::KeyValue { value, .. } => value.as_string_literal(),
                    _ => None,
                };
                match path {
                    Some(path) => loader.add_file(path),
                    None => return Err(self.error_at(loc, "fileloader entries must be string paths")),
                }
            }
        } else {
            for arg in self.parse_arguments()? {
                match arg.as_string_literal() {
                    Some(path) => loader.add_file(path),
                    None => return Err(self.error_at(loc, "fileloader arguments must be string paths")),
                }
            }
            if self.check(&Token::LBrace) {
                body = self.parse_block()?;
            }
        }
        self.eat(&Token::Semicolon);
        Ok(Stmt::Chtl {
            node: chtl_node(loader, loc),
            target: None,
            body,
        })
    }

    /// `listen(target, { event: handler })`, `listen(target, 'event', handler)`,
    /// `listen(target, handler)`; with an arrow target only the events remain.
    pub(crate) fn parse_listen(&mut self, target: Option<Expr>) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Listen, "'listen'")?;
        let mut args = self.parse_arguments()?;
        let target = match target {
            Some(t) => t,
            None if args.is_empty() => {
                return Err(self.error_at(loc, "listen expects a target and handlers"))
            }
            None => args.remove(0),
        };

        let mut listen = Listen::new();
        match args.as_slice() {
            [Expr::Object(props)] => {
                for (event, handler) in property_map(props) {
                    listen.add_event(event, handler);
                }
            }
            [event, handler] if event.as_string_literal().is_some() => {
                let event = event.as_string_literal().unwrap_or_default();
                listen.add_event(event, expr_to_js(handler));
            }
            [handler] if handler.is_function_like() || matches!(handler, Expr::Ident(_)) => {
                listen.add_event(DEFAULT_EVENT, expr_to_js(handler));
            }
            _ => return Err(self.error_at(loc, "Invalid listen arguments")),
        }
        self.consume_terminator()?;

        let mut node = chtl_node(listen, loc);
        if let Some(sel) = selector_text(&target) {
            node = node.with_attribute("target", sel);
        }
        Ok(Stmt::Chtl {
            node,
            target: Some(target),
            body: Vec::new(),
        })
    }

    /// `delegate(targets, 'event', handler)`, `delegate(targets, { event: handler })`
    /// or `delegate({ target: targets, event: handler })`. `parent` is the
    /// selector of the arrow form.
    pub(crate) fn parse_delegate(&mut self, parent: Option<EnhancedSelector>) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Delegate, "'delegate'")?;
        let args = self.parse_arguments()?;
        let mut delegate = Delegate::new();
        if let Some(parent) = &parent {
            delegate.set_parent(parent.selector());
        }

        let add_targets = |delegate: &mut Delegate, expr: &Expr| -> bool {
            match expr {
                Expr::Array(items) => items
                    .iter()
                    .map(|item| selector_text(item).map(|s| delegate.add_target(s)))
                    .all(|added| added.is_some()),
                other => selector_text(other).map(|s| delegate.add_target(s)).is_some(),
            }
        };

        let ok = match args.as_slice() {
            [Expr::Object(props)] => {
                let mut ok = true;
                for (key, value) in object_entries(props) {
                    if key == "target" {
                        ok &= add_targets(&mut delegate, value);
                    } else {
                        delegate.add_event(key, expr_to_js(value));
                    }
                }
                ok
            }
            [targets, Expr::Object(props)] => {
                for (event, handler) in property_map(props) {
                    delegate.add_event(event, handler);
                }
                add_targets(&mut delegate, targets)
            }
            [targets, event, handler] if event.as_string_literal().is_some() => {
                let event = event.as_string_literal().unwrap_or_default();
                delegate.add_event(event, expr_to_js(handler));
                add_targets(&mut delegate, targets)
            }
            _ => false,
        };
        if !ok {
            return Err(self.error_at(loc, "Invalid delegate arguments"));
        }
        self.consume_terminator()?;
        Ok(Stmt::Chtl {
            node: chtl_node(delegate, loc),
            target: None,
            body: Vec::new(),
        })
    }

    /// `animate(target, { options })`, `animate({ target, options })`,
    /// `animate(target, callback)`.
    pub(crate) fn parse_animate(&mut self, target: Option<EnhancedSelector>) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Animate, "'animate'")?;
        let args = self.parse_arguments()?;
        let mut animate = Animate::new(target.map(|t| t.selector().to_string()).unwrap_or_default());

        let options: &[Property] = match args.as_slice() {
            [Expr::Object(props)] => props,
            [t, Expr::Object(props)] if selector_text(t).is_some() => {
                animate.target = selector_text(t).unwrap_or_default();
                props
            }
            [t, callback] if selector_text(t).is_some() && callback.is_function_like() => {
                animate.target = selector_text(t).unwrap_or_default();
                animate.callback = Some(expr_to_js(callback));
                &[]
            }
            [callback] if callback.is_function_like() => {
                animate.callback = Some(expr_to_js(callback));
                &[]
            }
            _ => return Err(self.error_at(loc, "Invalid animate arguments")),
        };

        for (key, value) in object_entries(options) {
            match key.as_str() {
                "target" => match selector_text(value) {
                    Some(sel) => animate.target = sel,
                    None => return Err(self.error_at(loc, "animate target must be a selector")),
                },
                "duration" | "delay" | "loop" => {
                    let Some(n) = number_value(value) else {
                        return Err(self.error_at(loc, format!("animate {} must be a number", key)));
                    };
                    match key.as_str() {
                        "duration" => animate.duration = n.max(0.0) as u64,
                        "delay" => animate.delay = n.max(0.0) as u64,
                        _ => animate.loop_count = n as i64,
                    }
                }
                "easing" | "direction" => {
                    let text = value.as_string_literal().unwrap_or_else(|| expr_to_js(value));
                    if key == "easing" {
                        animate.easing = text;
                    } else {
                        animate.direction = text;
                    }
                }
                "begin" | "end" => {
                    let Expr::Object(props) = value else {
                        return Err(self.error_at(loc, format!("animate {} must be an object", key)));
                    };
                    if key == "begin" {
                        animate.begin = property_map(props);
                    } else {
                        animate.end = property_map(props);
                    }
                }
                "when" => {
                    let Expr::Array(frames) = value else {
                        return Err(self.error_at(loc, "animate when must be an array of keyframes"));
                    };
                    for frame in frames {
                        let Expr::Object(props) = frame else {
                            return Err(self.error_at(loc, "keyframes must be objects"));
                        };
                        let mut properties = property_map(props);
                        let at = properties
                            .shift_remove("at")
                            .and_then(|at| at.parse::<f64>().ok())
                            .unwrap_or(0.0);
                        animate.keyframes.push(Keyframe { at, properties });
                    }
                }
                "callback" => animate.callback = Some(expr_to_js(value)),
                other => log::debug!("ignoring unknown animate option '{}'", other),
            }
        }
        self.consume_terminator()?;
        Ok(Stmt::Chtl {
            node: chtl_node(animate, loc),
            target: None,
            body: Vec::new(),
        })
    }

    /// `vir Name = [iNeverAway] { ... }` or `vir({{selector}})`.
    pub(crate) fn parse_vir(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Vir, "'vir'")?;

        let vir = if self.check(&Token::LParen) {
            let args = self.parse_arguments()?;
            let [arg] = args.as_slice() else {
                return Err(self.error_at(loc, "vir expects a single selector"));
            };
            let Some(sel) = selector_text(arg) else {
                return Err(self.error_at(loc, "vir expects a single selector"));
            };
            let mut vir = Vir::new(vir_name_from_selector(&sel));
            vir.add_property("element", EnhancedSelector::new(sel).to_javascript());
            vir
        } else {
            let name = self.expect_ident("virtual object name")?;
            self.expect(&Token::Assign, "'=' after virtual object name")?;
            let never_away = self.eat(&Token::LBracket);
            if never_away {
                self.expect(&Token::INeverAway, "'iNeverAway'")?;
                self.expect(&Token::RBracket, "']'")?;
            } else {
                self.eat(&Token::INeverAway);
            }
            let value = self.parse_assignment()?;
            let props = match &value {
                Expr::Object(props) => props,
                Expr::Call { args, .. } => match args.as_slice() {
                    [Expr::Object(props)] => props,
                    _ => return Err(self.error_at(loc, "vir expects an object literal")),
                },
                _ => return Err(self.error_at(loc, "vir expects an object literal")),
            };
            let mut vir = Vir::new(name);
            for (key, value) in property_map(props) {
                vir.add_property(key, value);
            }
            vir
        };
        self.consume_terminator()?;
        Ok(Stmt::Chtl {
            node: chtl_node(vir, loc),
            target: None,
            body: Vec::new(),
        })
    }

    /// `router({ mode, root, routes: [...] })` or `router('/url', page [, handler])`.
    pub(crate) fn parse_router(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Router, "'router'")?;
        let args = self.parse_arguments()?;
        let mut router = Router::new();

        match args.as_slice() {
            [Expr::Object(props)] => {
                let entries = object_entries(props);
                if entries.iter().any(|(k, _)| k == "url") {
                    router.add_route(self.route_from_object(loc, props)?);
                }
                for (key, value) in entries {
                    match key.as_str() {
                        "mode" => {
                            router.mode = value.as_string_literal().unwrap_or_else(|| expr_to_js(value))
                        }
                        "root" => router.root = selector_text(value).unwrap_or_default(),
                        "routes" => {
                            let Expr::Array(items) = value else {
                                return Err(self.error_at(loc, "router routes must be an array"));
                            };
                            for item in items {
                                let Expr::Object(route) = item else {
                                    return Err(self.error_at(loc, "router routes must be objects"));
                                };
                                router.add_route(self.route_from_object(loc, route)?);
                            }
                        }
                        _ => {}
                    }
                }
            }
            [url, rest @ ..] if url.as_string_literal().is_some() && rest.len() <= 2 => {
                let mut route = Route::new(url.as_string_literal().unwrap_or_default(), "");
                for arg in rest {
                    if let Some(sel) = selector_text(arg) {
                        route.selector = sel;
                    } else if arg.is_function_like() {
                        route.handler = Some(expr_to_js(arg));
                    } else {
                        return Err(self.error_at(loc, "Invalid router arguments"));
                    }
                }
                router.add_route(route);
            }
            _ => return Err(self.error_at(loc, "Invalid router arguments")),
        }
        if router.mode != "hash" && router.mode != "history" {
            return Err(self.error_at(
                loc,
                format!("Unknown router mode '{}'; expected 'hash' or 'history'", router.mode),
            ));
        }
        self.consume_terminator()?;
        Ok(Stmt::Chtl {
            node: chtl_node(router, loc),
            target: None,
            body: Vec::new(),
        })
    }

    fn route_from_object(&self, loc: SourceLocation, props: &[Property]) -> ParseResult<Route> {
        let mut route = Route::new("", "");
        for (key, value) in object_entries(props) {
            match key.as_str() {
                "url" => route.url = value.as_string_literal().unwrap_or_default(),
                "page" | "selector" => route.selector = selector_text(value).unwrap_or_default(),
                "handler" => route.handler = Some(expr_to_js(value)),
                _ => {}
            }
        }
        if route.url.is_empty() {
            return Err(self.error_at(loc, "route is missing its url"));
        }
        Ok(route)
    }

    /// `util condition [change statement] then statement`
    pub(crate) fn parse_util(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        self.expect(&Token::Util, "'util'")?;
        let condition = self.parse_expression()?;
        let on_change = match self.peek() {
            Some(Token::Ident(word)) if word == "change" => {
                self.bump();
                Some(Box::new(self.parse_util_branch()?))
            }
            _ => None,
        };
        self.expect(&Token::Then, "'then' after util condition")?;
        let then = Box::new(self.parse_util_branch()?);
        self.eat(&Token::Semicolon);
        Ok(Stmt::Util {
            loc,
            condition,
            on_change,
            then,
        })
    }

    /// A block, or a bare expression that may be followed by `then` on the same line.
    fn parse_util_branch(&mut self) -> ParseResult<Stmt> {
        let loc = self.location();
        if self.check(&Token::LBrace) {
            let body = self.parse_block()?;
            return Ok(Stmt::Block { loc, body });
        }
        let expr = self.parse_expression()?;
        Ok(Stmt::Expr { loc, expr })
    }
}
