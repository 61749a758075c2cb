//! CHTL JS specific syntax nodes and their lowering to JavaScript.
//!
//! Every node kind has a single pure `to_javascript()` which is total: when a
//! node lacks the data it needs, it lowers to a one-line comment naming what
//! is missing instead of failing.

mod animate;
mod delegate;
mod file_loader;
mod listen;
mod router;
mod selector;
mod vir;

pub use animate::{Animate, Keyframe};
pub use delegate::Delegate;
pub use file_loader::FileLoader;
pub use listen::Listen;
pub use router::{Route, Router};
pub use selector::EnhancedSelector;
pub use vir::Vir;

use crate::SourceLocation;
use std::collections::BTreeMap;

/// Kind-specific payload of a CHTL JS node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    FileLoader(FileLoader),
    EnhancedSelector(EnhancedSelector),
    Listen(Listen),
    Delegate(Delegate),
    Animate(Animate),
    Vir(Vir),
    Router(Router),
}

impl NodeKind {
    /// Stable key naming the node kind (also the custom-lowering registry key).
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::FileLoader(_) => "fileloader",
            NodeKind::EnhancedSelector(_) => "enhancedSelector",
            NodeKind::Listen(_) => "listen",
            NodeKind::Delegate(_) => "delegate",
            NodeKind::Animate(_) => "animate",
            NodeKind::Vir(_) => "vir",
            NodeKind::Router(_) => "router",
        }
    }
}

/// A CHTL JS node: payload, source position and an open attribute map.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub location: SourceLocation,
    attributes: BTreeMap<String, String>,
}

impl Node {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            kind,
            location,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn to_javascript(&self) -> String {
        match &self.kind {
            NodeKind::FileLoader(n) => n.to_javascript(),
            NodeKind::EnhancedSelector(n) => n.to_javascript(),
            NodeKind::Listen(n) => n.to_javascript(),
            NodeKind::Delegate(n) => n.to_javascript(),
            NodeKind::Animate(n) => n.to_javascript(),
            NodeKind::Vir(n) => n.to_javascript(),
            NodeKind::Router(n) => n.to_javascript(),
        }
    }

    /// Informational findings about optional data this node lacks.
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        match &self.kind {
            NodeKind::FileLoader(n) if n.files().is_empty() => {
                out.push("fileloader lists no files".to_string());
            }
            NodeKind::EnhancedSelector(n) if n.selector().trim().is_empty() => {
                out.push("enhanced selector is empty".to_string());
            }
            NodeKind::EnhancedSelector(n) if n.is_indexed() && n.index() < 0 => {
                out.push(format!(
                    "selector '{}' has brackets but no integer index; using querySelector",
                    n.selector()
                ));
            }
            NodeKind::Listen(n) if n.events().is_empty() => {
                out.push("listen registers no event handlers".to_string());
            }
            NodeKind::Delegate(n) if n.targets().is_empty() || n.events().is_empty() => {
                out.push("delegate has no targets or no event handlers".to_string());
            }
            NodeKind::Delegate(n) if n.events().len() > 1 => {
                out.push(format!(
                    "delegate binds a native listener only for '{}' on first registration",
                    n.events().keys().next().map(String::as_str).unwrap_or_default()
                ));
            }
            NodeKind::Animate(n) => {
                if n.target.is_empty() {
                    out.push("animate has no target selector".to_string());
                }
                for kf in &n.keyframes {
                    if !(0.0..=1.0).contains(&kf.at) {
                        out.push(format!("keyframe at {} lies outside [0, 1]", kf.at));
                    }
                }
            }
            NodeKind::Vir(n) if n.name().is_empty() => {
                out.push("vir has no name".to_string());
            }
            NodeKind::Router(n) => {
                if n.routes.is_empty() {
                    out.push("router defines no routes".to_string());
                }
                if n.root.is_empty() {
                    out.push("router has no root selector; document.body is used".to_string());
                }
            }
            _ => {}
        }
        out
    }
}

macro_rules! impl_from_payload {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for NodeKind {
                fn from(n: $ty) -> Self {
                    NodeKind::$ty(n)
                }
            }

            impl From<$ty> for Node {
                fn from(n: $ty) -> Self {
                    Node::new(NodeKind::$ty(n), SourceLocation::default())
                }
            }
        )*
    };
}

impl_from_payload!(FileLoader, EnhancedSelector, Listen, Delegate, Animate, Vir, Router);

/// One-line comment emitted in place of code a node cannot produce.
pub(crate) fn omission(kind: &str, what: &str) -> String {
    log::warn!("{} node lowered to a comment: {}", kind, what);
    format!("// CHTL JS {}: {}", kind, what)
}

/// Render an ordered property map as an object literal body, one entry per line.
pub(crate) fn object_literal<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let lines: Vec<String> = entries
        .into_iter()
        .map(|(k, v)| format!("{}: {}", crate::text::object_key(k), v))
        .collect();
    if lines.is_empty() {
        "{}".to_string()
    } else {
        format!("{{\n{}\n}}", crate::text::indent(&lines.join(",\n"), 1))
    }
}
