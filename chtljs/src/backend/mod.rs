//! JavaScript backend.
//!
//! Module layout:
//! - `codegen`: lowering of the parsed program to JavaScript text
//! - `optimize`: text-level passes (clean, blank lines, minify)

pub mod codegen;
pub mod optimize;

pub use codegen::{expr_to_js, Codegen, CustomLowering, LoweringRegistry};
pub use optimize::{PassManager, TextPass};
