//! Placeholder source map.
//!
//! Only a fixed stub is produced (one source, a single `AAAA` mapping); it
//! lets tooling that expects a `sourceMappingURL` comment load the output.

use base64::{engine::general_purpose, Engine};
use serde::Serialize;

pub const SOURCE_NAME: &str = "input.chtljs";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    pub version: u32,
    pub sources: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    pub fn placeholder() -> Self {
        Self {
            version: 3,
            sources: vec![SOURCE_NAME.to_string()],
            names: Vec::new(),
            mappings: "AAAA".to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// `//# sourceMappingURL=` comment carrying the map inline as a base64
    /// data URL.
    pub fn to_comment(&self) -> String {
        format!(
            "//# sourceMappingURL=data:application/json;base64,{}",
            general_purpose::STANDARD.encode(self.to_json())
        )
    }
}

/// Append the placeholder map comment to `code`.
pub fn append_source_map(code: &str) -> String {
    let mut out = code.trim_end_matches('\n').to_string();
    out.push('\n');
    out.push_str(&SourceMap::placeholder().to_comment());
    out.push('\n');
    out
}
