pub mod ast;
pub mod backend;
pub mod compiler;
pub mod diagnostics;
pub mod frontend;
pub mod node;
pub mod options;
pub mod source_map;
pub mod text;

pub use compiler::ChtlJsCompiler;
pub use diagnostics::{Diagnostic, Severity};
pub use options::CompileOptions;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Parse error at {line}:{col}: {message}\n  Context: {context}")]
    Parse {
        line: usize,
        col: usize,
        context: String,
        message: String,
    },

    #[error("{0}")]
    Validation(String),
}

/// 1-based source position; `offset` is a byte offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Parse CHTL JS source into a program, collecting every recoverable error.
pub fn parse(source: &str) -> (ast::Program, Vec<CompileError>) {
    frontend::parser::parse_program(source)
}

/// Compile CHTL JS source to a JavaScript program body (no wrapper, no
/// optimization). Fails with the first error the parser reports.
pub fn compile_to_js(source: &str) -> Result<String, CompileError> {
    let (program, mut errors) = parse(source);
    if !errors.is_empty() {
        return Err(errors.remove(0));
    }
    Ok(backend::codegen::Codegen::new().lower_program(&program))
}
