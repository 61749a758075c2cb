use super::omission;
use crate::text::quote;
use indexmap::IndexMap;

/// Event listeners attached to an element supplied by the surrounding code.
#[derive(Debug, Clone, Default)]
pub struct Listen {
    events: IndexMap<String, String>,
}

impl Listen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`; a later registration for the same
    /// event replaces the earlier one.
    pub fn add_event(&mut self, event: impl Into<String>, handler: impl Into<String>) {
        self.events.insert(event.into(), handler.into());
    }

    pub fn events(&self) -> &IndexMap<String, String> {
        &self.events
    }

    /// One `element.addEventListener(...)` line per event. The `element`
    /// binding is provided by the enclosing generated code.
    pub fn to_javascript(&self) -> String {
        if self.events.is_empty() {
            return omission("listen", "no listeners");
        }
        self.events
            .iter()
            .map(|(event, handler)| {
                format!("element.addEventListener({}, {});", quote(event), handler)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
