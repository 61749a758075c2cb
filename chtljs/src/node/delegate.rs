use super::omission;
use crate::text::{indent, quote};
use indexmap::IndexMap;

/// Global the generated code keeps its delegation records in.
pub const DELEGATION_REGISTRY: &str = "__chtljsDelegationRegistry";

/// Event delegation for one or more target selectors.
#[derive(Debug, Clone, Default)]
pub struct Delegate {
    /// Selector of the element the native listener is bound to; `document` when unset.
    parent: Option<String>,
    targets: Vec<String>,
    events: IndexMap<String, String>,
}

impl Delegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parent(&mut self, selector: impl Into<String>) {
        self.parent = Some(selector.into());
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn add_target(&mut self, selector: impl Into<String>) {
        self.targets.push(selector.into());
    }

    pub fn add_event(&mut self, event: impl Into<String>, handler: impl Into<String>) {
        self.events.insert(event.into(), handler.into());
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn events(&self) -> &IndexMap<String, String> {
        &self.events
    }

    /// Registers the handlers in the page-wide delegation registry.
    ///
    /// The first registration for a selector creates its record and attaches a
    /// single native listener for the first event type of that call; later
    /// calls for the same selector only merge into the record's events map.
    pub fn to_javascript(&self) -> String {
        if self.targets.is_empty() || self.events.is_empty() {
            return omission("delegate", "no delegation");
        }
        let Some(first_event) = self.events.keys().next() else {
            return omission("delegate", "no delegation");
        };

        let handlers = self
            .events
            .iter()
            .map(|(event, handler)| format!("{}: {}", quote(event), handler))
            .collect::<Vec<_>>()
            .join(",\n");
        let targets = self
            .targets
            .iter()
            .map(|t| quote(t))
            .collect::<Vec<_>>()
            .join(", ");

        let parent = match &self.parent {
            Some(sel) => format!("document.querySelector({}) || document", quote(sel)),
            None => "document".to_string(),
        };

        let mut out = String::new();
        out.push_str("(function() {\n");
        out.push_str(&format!(
            "    var registry = window.{reg} = window.{reg} || {{}};\n",
            reg = DELEGATION_REGISTRY
        ));
        out.push_str("    var handlers = {\n");
        out.push_str(&indent(&handlers, 2));
        out.push_str("\n    };\n");
        out.push_str("    function merge(record) {\n");
        out.push_str("        for (var type in handlers) {\n");
        out.push_str("            record.events[type] = handlers[type];\n");
        out.push_str("        }\n");
        out.push_str("    }\n");
        out.push_str(&format!("    [{}].forEach(function(selector) {{\n", targets));
        out.push_str("        var record = registry[selector];\n");
        out.push_str("        if (record) {\n");
        out.push_str("            merge(record);\n");
        out.push_str("            return;\n");
        out.push_str("        }\n");
        out.push_str(&format!(
            "        record = registry[selector] = {{ parent: {}, events: {{}} }};\n",
            parent
        ));
        out.push_str("        merge(record);\n");
        out.push_str(&format!(
            "        record.parent.addEventListener({}, function(event) {{\n",
            quote(first_event)
        ));
        out.push_str("            var target = event.target && event.target.closest ? event.target.closest(selector) : null;\n");
        out.push_str("            var handler = record.events[event.type];\n");
        out.push_str("            if (target && handler) {\n");
        out.push_str("                handler.call(target, event);\n");
        out.push_str("            }\n");
        out.push_str("        });\n");
        out.push_str("    });\n");
        out.push_str("})();");
        out
    }
}
