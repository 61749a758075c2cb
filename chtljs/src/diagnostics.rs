//! Diagnostics accumulated by the compiler instead of raising errors.

use crate::{CompileError, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Shallow pre-parse check failure; aborts the compile call.
    Validation,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Validation,
            message: message.into(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    pub fn warning(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Validation => write!(f, "{}", self.message)?,
            Severity::Error => write!(f, "Error: {}", self.message)?,
            Severity::Warning => write!(f, "Warning: {}", self.message)?,
        }
        if let Some(loc) = self.location {
            write!(f, " (line {}, column {})", loc.line, loc.column)?;
        }
        Ok(())
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(e: &CompileError) -> Self {
        match e {
            CompileError::Lexical(lex) => Diagnostic::error(
                format!("Unexpected character '{}'", lex.unexpected_char),
                Some(SourceLocation::new(lex.line, lex.column, lex.location)),
            ),
            CompileError::Parse {
                line, col, message, ..
            } => Diagnostic::error(message.clone(), Some(SourceLocation::new(*line, *col, 0))),
            CompileError::Validation(message) => Diagnostic::validation(message.clone()),
        }
    }
}
