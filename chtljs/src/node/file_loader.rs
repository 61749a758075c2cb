use super::omission;
use crate::text::{indent, quote};

/// `fileloader(...)`: files to load, in order.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    files: Vec<String>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file; duplicates are kept since the list is the load order.
    pub fn add_file(&mut self, path: impl Into<String>) {
        self.files.push(path.into());
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn to_javascript(&self) -> String {
        self.to_javascript_with_body("")
    }

    /// Module definition depending on the listed files, with `body` placed
    /// inside the factory before the (empty) export object is returned.
    pub fn to_javascript_with_body(&self, body: &str) -> String {
        if self.files.is_empty() {
            return omission("fileloader", "no files to load");
        }
        let order = self
            .files
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}) {}", i + 1, f))
            .collect::<Vec<_>>()
            .join(", ");
        let deps = self
            .files
            .iter()
            .map(|f| quote(f))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        out.push_str(&format!("// fileloader: load order {}\n", order));
        out.push_str(&format!("define([{}], function() {{\n", deps));
        out.push_str("    var exports = {};\n");
        if !body.trim().is_empty() {
            out.push_str(&indent(body, 1));
            out.push('\n');
        }
        out.push_str("    return exports;\n");
        out.push_str("});");
        out
    }
}
