use crate::text::quote;

/// `{{selector}}`: a DOM query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedSelector {
    selector: String,
    indexed: bool,
    index: i64,
}

impl EnhancedSelector {
    pub fn new(selector: impl Into<String>) -> Self {
        let selector = selector.into().trim().to_string();
        let indexed = selector.contains('[') && selector.contains(']');
        let index = if indexed {
            Self::parse_index(&selector)
        } else {
            -1
        };
        Self {
            selector,
            indexed,
            index,
        }
    }

    /// Integer between the first `[` and the following `]`, or `-1`.
    fn parse_index(selector: &str) -> i64 {
        let Some(open) = selector.find('[') else {
            return -1;
        };
        let Some(len) = selector[open + 1..].find(']') else {
            return -1;
        };
        selector[open + 1..open + 1 + len]
            .trim()
            .parse::<i64>()
            .unwrap_or(-1)
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Index inside the brackets; `-1` means no index.
    pub fn index(&self) -> i64 {
        self.index
    }

    /// The selector without its `[N]` suffix.
    pub fn base(&self) -> &str {
        match self.selector.find('[') {
            Some(open) => self.selector[..open].trim_end(),
            None => &self.selector,
        }
    }

    pub fn to_javascript(&self) -> String {
        if self.selector.is_empty() {
            return "null /* CHTL JS enhanced selector: empty selector */".to_string();
        }
        if self.indexed && self.index >= 0 {
            format!(
                "document.querySelectorAll({})[{}]",
                quote(self.base()),
                self.index
            )
        } else {
            format!("document.querySelector({})", quote(&self.selector))
        }
    }
}
