//! JavaScript code generation.
//!
//! Contains the [`Codegen`] driver. Statement lowering lives in `program.rs`,
//! expression lowering (with precedence-aware parenthesization) in
//! `lowering.rs`. Output is indented with four spaces per block level.

mod lowering;
mod program;

use crate::ast::{Expr, Program, Stmt};
use crate::node::Node;
use std::collections::HashMap;

// ============================================================================
// Custom lowering registry
// ============================================================================

/// A user-supplied replacement for a node kind's default lowering.
pub type CustomLowering = Box<dyn Fn(&Node) -> String>;

/// Custom lowerings keyed by node kind name (see [`crate::node::NodeKind::name`]).
pub type LoweringRegistry = HashMap<String, CustomLowering>;

// ============================================================================
// Codegen state
// ============================================================================

/// Lowers a parsed [`Program`] to JavaScript text.
///
/// Lowering is total: every statement and expression produces text, and
/// CHTL JS nodes lacking required data produce a comment instead.
pub struct Codegen<'a> {
    custom: Option<&'a LoweringRegistry>,
}

impl Default for Codegen<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Codegen<'a> {
    pub fn new() -> Self {
        Self { custom: None }
    }

    /// Codegen that consults `registry` before each node kind's default lowering.
    pub fn with_custom_lowerings(registry: &'a LoweringRegistry) -> Self {
        Self {
            custom: Some(registry),
        }
    }

    /// Lower every top-level statement, one per line group.
    pub fn lower_program(&self, program: &Program) -> String {
        log::debug!("lowering {} statements", program.statements.len());
        self.lower_stmts(&program.statements)
    }

    /// Lower a statement list, joined by newlines.
    pub fn lower_stmts(&self, stmts: &[Stmt]) -> String {
        stmts
            .iter()
            .map(|s| self.lower_stmt(s))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lower a single CHTL JS node, honoring custom lowerings.
    pub fn lower_node(&self, node: &Node) -> String {
        match self.custom_lowering(node) {
            Some(text) => text,
            None => node.to_javascript(),
        }
    }

    pub(crate) fn custom_lowering(&self, node: &Node) -> Option<String> {
        let lowering = self.custom?.get(node.kind.name())?;
        log::trace!("custom lowering for {}", node.kind.name());
        Some(lowering(node))
    }
}

/// Lower a lone expression with the default lowerings.
pub fn expr_to_js(expr: &Expr) -> String {
    Codegen::new().lower_expr(expr)
}
