//! HTML Meta Tag Lookup
//!
//! Collects `<meta>` tags keyed by `name`, `property` or `itemprop`
//! (lowercased) so field strategies can ask for the first non-empty
//! value among several keys, in priority order.

use dom_query::{Document, Selection};

use crate::dom;

/// All `<meta>` key/content pairs of a document, in document order.
#[derive(Debug, Clone, Default)]
pub struct MetaTags {
    entries: Vec<(String, String)>,
}

impl MetaTags {
    /// Collect every meta tag that has both a key and non-empty content.
    #[must_use]
    pub fn collect(doc: &Document) -> Self {
        let mut entries = Vec::new();

        for node in doc.select("meta").nodes() {
            let meta = Selection::from(*node);

            let key = dom::get_attribute(&meta, "property")
                .or_else(|| dom::get_attribute(&meta, "name"))
                .or_else(|| dom::get_attribute(&meta, "itemprop"))
                .unwrap_or_default()
                .trim()
                .to_lowercase();

            let content = dom::get_attribute(&meta, "content")
                .map(|c| c.trim().to_string())
                .unwrap_or_default();

            if key.is_empty() || content.is_empty() {
                continue;
            }
            entries.push((key, content));
        }

        Self { entries }
    }

    /// First value for the earliest key in `keys` that is present.
    #[must_use]
    pub fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| {
            self.entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        })
    }

    /// Every value for one key, in document order.
    #[must_use]
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
