use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recognized option keys and their defaults.
pub const DEFAULT_OPTIONS: [(&str, &str); 9] = [
    ("strictMode", "true"),
    ("minify", "false"),
    ("sourceMap", "false"),
    ("beautify", "true"),
    ("removeComments", "false"),
    ("removeWhitespace", "false"),
    ("optimize", "true"),
    ("warnings", "true"),
    ("errors", "true"),
];

/// String-keyed compile options. Unknown keys are stored but ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct CompileOptions {
    values: BTreeMap<String, String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        let values = DEFAULT_OPTIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { values }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value of `key`, or the empty string when it is not set.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// `true` only when the option is literally `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == "true"
    }

    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Drop every setting and restore the defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
