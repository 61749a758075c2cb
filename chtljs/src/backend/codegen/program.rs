//! Statement lowering, including the CHTL JS statement forms.

use super::Codegen;
use crate::ast::{Declarator, DeclKind, Expr, ForHead, Stmt};
use crate::node::{EnhancedSelector, Node, NodeKind};
use crate::text::indent;

/// Milliseconds between `util` condition checks.
pub const UTIL_POLL_INTERVAL_MS: u32 = 100;

impl Codegen<'_> {
    pub fn lower_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expr { expr, .. } => {
                let text = self.lower_expr(expr);
                if text.starts_with("function(") || text.starts_with("function ") || text.starts_with('{') {
                    format!("({});", text)
                } else {
                    format!("{};", text)
                }
            }
            Stmt::VarDecl { kind, decls, .. } => format!("{};", self.lower_decl(*kind, decls)),
            Stmt::Function { def, .. } => self.lower_function(def),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let mut out = format!(
                    "if ({}) {}",
                    self.lower_expr(condition),
                    self.lower_branch(then_branch)
                );
                if let Some(alt) = else_branch {
                    out.push_str(" else ");
                    match alt.as_ref() {
                        Stmt::If { .. } => out.push_str(&self.lower_stmt(alt)),
                        other => out.push_str(&self.lower_branch(other)),
                    }
                }
                out
            }
            Stmt::For { head, body, .. } => {
                let head = match head {
                    ForHead::Classic { init, test, update } => {
                        let init = match init.as_deref() {
                            Some(Stmt::VarDecl { kind, decls, .. }) => self.lower_decl(*kind, decls),
                            Some(Stmt::Expr { expr, .. }) => self.lower_expr(expr),
                            _ => String::new(),
                        };
                        let test = test.as_ref().map(|e| self.lower_expr(e)).unwrap_or_default();
                        let update = update.as_ref().map(|e| self.lower_expr(e)).unwrap_or_default();
                        format!("{}; {}; {}", init, test, update)
                    }
                    ForHead::Each {
                        kind,
                        name,
                        of,
                        iterable,
                    } => format!(
                        "{}{} {} {}",
                        kind.map(|k| format!("{} ", k.as_str())).unwrap_or_default(),
                        name,
                        if *of { "of" } else { "in" },
                        self.lower_expr(iterable)
                    ),
                };
                format!("for ({}) {}", head, self.lower_branch(body))
            }
            Stmt::While {
                condition, body, ..
            } => format!(
                "while ({}) {}",
                self.lower_expr(condition),
                self.lower_branch(body)
            ),
            Stmt::DoWhile {
                body, condition, ..
            } => format!(
                "do {} while ({});",
                self.lower_branch(body),
                self.lower_expr(condition)
            ),
            Stmt::Switch {
                discriminant,
                cases,
                ..
            } => {
                let mut arms = Vec::new();
                for case in cases {
                    let label = match &case.test {
                        Some(test) => format!("case {}:", self.lower_expr(test)),
                        None => "default:".to_string(),
                    };
                    if case.body.is_empty() {
                        arms.push(label);
                    } else {
                        arms.push(format!("{}\n{}", label, indent(&self.lower_stmts(&case.body), 1)));
                    }
                }
                if arms.is_empty() {
                    format!("switch ({}) {{}}", self.lower_expr(discriminant))
                } else {
                    format!(
                        "switch ({}) {{\n{}\n}}",
                        self.lower_expr(discriminant),
                        indent(&arms.join("\n"), 1)
                    )
                }
            }
            Stmt::Break { label, .. } => match label {
                Some(l) => format!("break {};", l),
                None => "break;".to_string(),
            },
            Stmt::Continue { label, .. } => match label {
                Some(l) => format!("continue {};", l),
                None => "continue;".to_string(),
            },
            Stmt::Return { value, .. } => match value {
                Some(v) => format!("return {};", self.lower_expr(v)),
                None => "return;".to_string(),
            },
            Stmt::Throw { value, .. } => format!("throw {};", self.lower_expr(value)),
            Stmt::Try {
                block,
                param,
                handler,
                finalizer,
                ..
            } => {
                let mut out = format!("try {}", self.lower_block(block));
                if let Some(handler) = handler {
                    match param {
                        Some(p) => out.push_str(&format!(" catch ({}) ", p)),
                        None => out.push_str(" catch "),
                    }
                    out.push_str(&self.lower_block(handler));
                }
                if let Some(finalizer) = finalizer {
                    out.push_str(" finally ");
                    out.push_str(&self.lower_block(finalizer));
                }
                out
            }
            Stmt::Block { body, .. } => self.lower_block(body),
            Stmt::Empty { .. } => ";".to_string(),
            Stmt::Chtl { node, target, body } => self.lower_chtl(node, target.as_ref(), body),
            Stmt::Util {
                condition,
                on_change,
                then,
                ..
            } => self.lower_util(condition, on_change.as_deref(), then),
        }
    }

    /// `{ ... }` with the statements indented one level.
    pub(crate) fn lower_block(&self, body: &[Stmt]) -> String {
        if body.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{}\n}}", indent(&self.lower_stmts(body), 1))
        }
    }

    /// Control-flow bodies are always emitted as blocks.
    fn lower_branch(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Block { body, .. } => self.lower_block(body),
            other => self.lower_block(std::slice::from_ref(other)),
        }
    }

    fn lower_decl(&self, kind: DeclKind, decls: &[Declarator]) -> String {
        let items = decls
            .iter()
            .map(|d| match &d.init {
                Some(init) => {
                    let value = self.lower_expr(init);
                    match init {
                        Expr::Sequence(_) => format!("{} = ({})", d.name, value),
                        _ => format!("{} = {}", d.name, value),
                    }
                }
                None => d.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}", kind.as_str(), items)
    }

    fn lower_chtl(&self, node: &Node, target: Option<&Expr>, body: &[Stmt]) -> String {
        if let Some(text) = self.custom_lowering(node) {
            return text;
        }
        match (&node.kind, target) {
            (NodeKind::Listen(listen), Some(target)) if !listen.events().is_empty() => {
                let mut out = String::new();
                out.push_str("(function(element) {\n");
                out.push_str("    if (!element) {\n");
                out.push_str("        return;\n");
                out.push_str("    }\n");
                out.push_str(&indent(&listen.to_javascript(), 1));
                let element = match target.as_string_literal() {
                    Some(sel) => EnhancedSelector::new(sel).to_javascript(),
                    None => self.lower_expr(target),
                };
                out.push_str(&format!("\n}})({});", element));
                out
            }
            (NodeKind::FileLoader(loader), _) => {
                loader.to_javascript_with_body(&self.lower_stmts(body))
            }
            _ => node.to_javascript(),
        }
    }

    /// Polls `condition`; on every change runs the change handler, and when the
    /// new value is truthy also the then handler.
    fn lower_util(&self, condition: &Expr, on_change: Option<&Stmt>, then: &Stmt) -> String {
        let cond = self.lower_expr(condition);
        let change = on_change.map(|s| self.lower_handler_body(s)).unwrap_or_default();
        let then = self.lower_handler_body(then);

        let mut out = String::new();
        out.push_str("(function() {\n");
        out.push_str("    function handleChange() {\n");
        if !change.is_empty() {
            out.push_str(&indent(&change, 2));
            out.push('\n');
        }
        out.push_str("    }\n");
        out.push_str("    function handleThen() {\n");
        out.push_str(&indent(&then, 2));
        out.push_str("\n    }\n");
        out.push_str(&format!("    var previousValue = {};\n", cond));
        out.push_str("    function checkCondition() {\n");
        out.push_str(&format!("        var currentValue = {};\n", cond));
        out.push_str("        if (currentValue !== previousValue) {\n");
        out.push_str("            handleChange();\n");
        out.push_str("            if (currentValue) {\n");
        out.push_str("                handleThen();\n");
        out.push_str("            }\n");
        out.push_str("        }\n");
        out.push_str("        previousValue = currentValue;\n");
        out.push_str("    }\n");
        out.push_str(&format!(
            "    setInterval(checkCondition, {});\n",
            UTIL_POLL_INTERVAL_MS
        ));
        out.push_str("})();");
        out
    }

    fn lower_handler_body(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Block { body, .. } => self.lower_stmts(body),
            other => self.lower_stmt(other),
        }
    }
}
