use super::{object_literal, omission};
use indexmap::IndexMap;

/// Virtual object: a named plain object plus a guarded property accessor.
#[derive(Debug, Clone, Default)]
pub struct Vir {
    name: String,
    properties: IndexMap<String, String>,
}

impl Vir {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn add_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Name of the generated accessor, e.g. `getBoxProperty` for `box`.
    pub fn accessor_name(&self) -> String {
        let mut chars = self.name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("get{}Property", capitalized)
    }

    pub fn to_javascript(&self) -> String {
        if self.name.is_empty() {
            return omission("vir", "missing object name");
        }
        let mut out = String::new();
        out.push_str(&format!(
            "const {} = {};\n",
            self.name,
            object_literal(&self.properties)
        ));
        out.push_str(&format!("function {}(property) {{\n", self.accessor_name()));
        out.push_str(&format!(
            "    if (Object.prototype.hasOwnProperty.call({}, property)) {{\n",
            self.name
        ));
        out.push_str(&format!("        return {}[property];\n", self.name));
        out.push_str("    }\n");
        out.push_str("    return undefined;\n");
        out.push('}');
        out
    }
}
