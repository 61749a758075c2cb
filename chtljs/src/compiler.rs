//! Compiler orchestration: validation, parsing, lowering, wrapping and the
//! staged optimization pipeline, driven by [`CompileOptions`].

use crate::ast::{Program, Stmt};
use crate::backend::codegen::{Codegen, LoweringRegistry};
use crate::backend::optimize::{self, scan, Region};
use crate::diagnostics::Diagnostic;
use crate::node::Node;
use crate::options::CompileOptions;
use crate::source_map::append_source_map;
use crate::text::indent;
use crate::CompileError;
use std::collections::BTreeMap;

pub const DEFAULT_OPTIMIZATION_LEVEL: u8 = 1;
pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;
pub const DEFAULT_OUTPUT_FORMAT: &str = "javascript";

/// Header line of the `compile` output.
const COMPILED_HEADER: &str = "// Compiled CHTL JS Code";

/// Compiles CHTL JS fragments to JavaScript.
///
/// Failures never surface as `Err`: a failed call returns an empty string
/// and the reasons are available from [`ChtlJsCompiler::errors`] until the
/// next call. An instance is not meant to be shared between threads.
pub struct ChtlJsCompiler {
    options: CompileOptions,
    optimization_level: u8,
    output_format: String,
    custom_lowerings: LoweringRegistry,
    validation_errors: Vec<String>,
    errors: Vec<Diagnostic>,
}

impl Default for ChtlJsCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChtlJsCompiler {
    pub fn new() -> Self {
        Self {
            options: CompileOptions::default(),
            optimization_level: DEFAULT_OPTIMIZATION_LEVEL,
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            custom_lowerings: LoweringRegistry::new(),
            validation_errors: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            options,
            ..Self::new()
        }
    }

    // ── Compilation ─────────────────────────────────────────────────────

    /// Compile a CHTL JS fragment into a strict-mode IIFE.
    ///
    /// Returns an empty string when validation fails or nothing could be
    /// parsed; otherwise best-effort code for everything that did parse.
    pub fn compile(&mut self, source: &str) -> String {
        self.errors.clear();
        if !self.validate(source) {
            self.errors = self
                .validation_errors
                .iter()
                .map(Diagnostic::validation)
                .collect();
            return String::new();
        }

        let (program, parse_errors) = crate::parse(source);
        log::debug!(
            "compile: {} statements, {} parse errors",
            program.statements.len(),
            parse_errors.len()
        );
        self.record_parse_errors(&parse_errors);
        self.record_warnings(&program);
        if program.statements.is_empty() && !parse_errors.is_empty() {
            return String::new();
        }

        let body = self.lower(&program.statements);
        let mut out = String::new();
        out.push_str(COMPILED_HEADER);
        out.push('\n');
        out.push_str(&self.wrap_local(&body));
        self.finish(out)
    }

    /// Wrap `stmts` in a strict-mode IIFE; names declared inside stay local
    /// to the element's script.
    pub fn compile_local_script(&mut self, stmts: &[Stmt]) -> String {
        self.errors.clear();
        let body = self.lower(stmts);
        let out = format!("// Local Script\n{}", self.wrap_local(&body));
        self.finish(out)
    }

    /// Emit `stmts` as top-level code sharing the page's global scope.
    pub fn compile_global_script(&mut self, stmts: &[Stmt]) -> String {
        self.errors.clear();
        let body = self.lower(stmts);
        let mut out = String::from("// Global Script\n");
        if self.options.flag("strictMode") {
            out.push_str("'use strict';\n\n");
        }
        out.push_str(&body);
        out.push('\n');
        self.finish(out)
    }

    /// Lower a single node, honoring custom lowerings.
    pub fn compile_node(&self, node: &Node) -> String {
        Codegen::with_custom_lowerings(&self.custom_lowerings).lower_node(node)
    }

    fn lower(&self, stmts: &[Stmt]) -> String {
        Codegen::with_custom_lowerings(&self.custom_lowerings).lower_stmts(stmts)
    }

    fn wrap_local(&self, body: &str) -> String {
        let mut out = String::from("(function() {\n");
        if self.options.flag("strictMode") {
            out.push_str("    'use strict';\n\n");
        }
        if !body.is_empty() {
            out.push_str(&indent(body, 1));
            out.push('\n');
        }
        out.push_str("})();\n");
        out
    }

    fn finish(&self, code: String) -> String {
        let code = self.optimize(&code);
        if self.options.flag("sourceMap") {
            append_source_map(&code)
        } else {
            code
        }
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    fn record_parse_errors(&mut self, errors: &[CompileError]) {
        if !self.options.flag("errors") {
            return;
        }
        self.errors.extend(errors.iter().map(Diagnostic::from));
    }

    fn record_warnings(&mut self, program: &Program) {
        if !self.options.flag("warnings") {
            return;
        }
        let refs = program.chtl_refs();
        for node in refs.nodes {
            for message in node.warnings() {
                self.errors
                    .push(Diagnostic::warning(message, Some(node.location)));
            }
        }
        for sel in refs.selectors {
            for message in Node::from(sel.clone()).warnings() {
                self.errors.push(Diagnostic::warning(message, None));
            }
        }
    }

    /// Diagnostics of the last call: validation errors, parse errors and warnings.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// The last call's diagnostics rendered for display.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|d| d.to_string()).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|d| !d.is_warning())
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Shallow pre-parse check: the source is non-empty and every `{{` has a
    /// matching `}}`. Strings and comments are skipped; a `}}` that closes two
    /// ordinary blocks is not a selector delimiter.
    pub fn validate(&mut self, source: &str) -> bool {
        self.validation_errors.clear();
        if source.is_empty() {
            self.validation_errors.push("Empty CHTL JS code".to_string());
            return false;
        }
        if let Err(message) = check_selector_balance(source) {
            self.validation_errors.push(message.to_string());
            return false;
        }
        true
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    /// Whether every bracket in `code` is matched, ignoring literals and comments.
    pub fn validate_javascript_syntax(&self, code: &str) -> bool {
        let mut stack: Vec<char> = Vec::new();
        let mut balanced = true;
        scan(code, |item| {
            let Some((c, Region::Code)) = item else {
                return;
            };
            match c {
                '(' | '[' | '{' => stack.push(c),
                ')' | ']' | '}' => {
                    let open = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.pop() != Some(open) {
                        balanced = false;
                    }
                }
                _ => {}
            }
        });
        if !balanced || !stack.is_empty() {
            log::debug!("unbalanced brackets in generated code");
            return false;
        }
        true
    }

    // ── Options ─────────────────────────────────────────────────────────

    pub fn set_compile_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.set(key, value);
    }

    /// Value of `key`, or the empty string for an unknown key.
    pub fn get_compile_option(&self, key: &str) -> String {
        self.options.get(key).to_string()
    }

    pub fn get_all_compile_options(&self) -> BTreeMap<String, String> {
        self.options.all().clone()
    }

    /// Restore the nine default options.
    pub fn clear_compile_options(&mut self) {
        self.options.reset();
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Set the optimization level, clamped to `0..=3`.
    pub fn set_optimization_level(&mut self, level: i32) {
        self.optimization_level = level.clamp(0, i32::from(MAX_OPTIMIZATION_LEVEL)) as u8;
    }

    pub fn get_optimization_level(&self) -> u8 {
        self.optimization_level
    }

    pub fn set_output_format(&mut self, format: impl Into<String>) {
        self.output_format = format.into();
    }

    pub fn get_output_format(&self) -> &str {
        &self.output_format
    }

    // ── Custom lowerings ────────────────────────────────────────────────

    /// Replace the default lowering of `kind` (e.g. `"listen"`).
    pub fn add_custom_lowering<F>(&mut self, kind: impl Into<String>, lowering: F)
    where
        F: Fn(&Node) -> String + 'static,
    {
        self.custom_lowerings.insert(kind.into(), Box::new(lowering));
    }

    /// Remove a custom lowering; returns whether one was registered.
    pub fn remove_custom_lowering(&mut self, kind: &str) -> bool {
        self.custom_lowerings.remove(kind).is_some()
    }

    pub fn has_custom_lowering(&self, kind: &str) -> bool {
        self.custom_lowerings.contains_key(kind)
    }

    // ── Text passes ─────────────────────────────────────────────────────

    /// Run the staged pipeline for the current optimization level.
    pub fn optimize(&self, code: &str) -> String {
        optimize::optimize(code, self.optimization_level, &self.options)
    }

    /// Re-indent `code` by bracket depth, four spaces per level. Returns the
    /// input unchanged when the `beautify` option is off.
    pub fn beautify(&self, code: &str) -> String {
        if !self.options.flag("beautify") {
            return code.to_string();
        }
        let mut depth: i64 = 0;
        let mut lines = Vec::new();
        for line in code.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                lines.push(String::new());
                continue;
            }
            let leading_closers = trimmed
                .chars()
                .take_while(|c| matches!(c, '}' | ']' | ')'))
                .count() as i64;
            let level = (depth - leading_closers).max(0) as usize;
            lines.push(indent(trimmed, level));

            let mut net = 0i64;
            scan(trimmed, |item| match item {
                Some(('{' | '[' | '(', Region::Code)) => net += 1,
                Some(('}' | ']' | ')', Region::Code)) => net -= 1,
                _ => {}
            });
            depth = (depth + net).max(0);
        }
        let mut out = lines.join("\n");
        if code.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Match `{{` against `}}`, treating a `}}` inside ordinary blocks as two
/// block closes.
fn check_selector_balance(source: &str) -> Result<(), &'static str> {
    let mut code: Vec<char> = Vec::with_capacity(source.len());
    scan(source, |item| match item {
        Some((c, Region::Code)) => code.push(c),
        _ => code.push(' '),
    });

    #[derive(PartialEq)]
    enum Open {
        Block,
        Selector,
    }
    let mut stack: Vec<Open> = Vec::new();
    let mut i = 0;
    while i < code.len() {
        let pair = (code[i], code.get(i + 1).copied());
        match pair {
            ('{', Some('{')) => {
                stack.push(Open::Selector);
                i += 2;
                continue;
            }
            ('{', _) => stack.push(Open::Block),
            ('}', next) => match stack.last() {
                Some(Open::Selector) if next == Some('}') => {
                    stack.pop();
                    i += 2;
                    continue;
                }
                Some(Open::Selector) => {}
                Some(Open::Block) => {
                    stack.pop();
                }
                None if next == Some('}') => return Err("Unopened enhanced selector"),
                None => {}
            },
            _ => {}
        }
        i += 1;
    }
    if stack.contains(&Open::Selector) {
        return Err("Unclosed enhanced selector");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check_selector_balance;

    #[test]
    fn nested_block_closes_are_not_selectors() {
        assert_eq!(check_selector_balance("function f() { if (a) { b(); }}"), Ok(()));
        assert_eq!(check_selector_balance("listen({{.a}}, { click: () => { go(); }});"), Ok(()));
    }

    #[test]
    fn delimiters_inside_strings_are_ignored() {
        assert_eq!(check_selector_balance("var s = '{{';"), Ok(()));
        assert_eq!(check_selector_balance("// }}\nvar a = 1;"), Ok(()));
    }

    #[test]
    fn unmatched_delimiters() {
        assert_eq!(check_selector_balance("{{"), Err("Unclosed enhanced selector"));
        assert_eq!(check_selector_balance("}}"), Err("Unopened enhanced selector"));
        assert_eq!(check_selector_balance("{{.a}} }}"), Err("Unopened enhanced selector"));
    }
}
