//! DOM Operations Adapter
//!
//! Thin helpers over `dom_query` used by every field extractor: attribute
//! access, tag names, and a block-aware text flattener that keeps line
//! breaks between block elements so section boundaries survive the
//! HTML-to-text conversion.

pub use dom_query::{Document, NodeRef, Selection};
pub use tendril::StrTendril;

// === Attribute Operations ===

/// Get element class attribute
#[inline]
#[must_use]
pub fn class_name(sel: &Selection) -> Option<String> {
    sel.attr("class").map(|s| s.to_string())
}

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// First non-empty value among several attributes, in order.
#[must_use]
pub fn first_attribute(sel: &Selection, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        sel.attr(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Concatenated `id`, `class` and `alt` attributes, lowercased, for keyword tests.
#[must_use]
pub fn attribute_fingerprint(sel: &Selection) -> String {
    let mut out = String::new();
    for name in ["id", "class", "alt", "title"] {
        if let Some(v) = sel.attr(name) {
            out.push_str(&v.to_lowercase());
            out.push(' ');
        }
    }
    out
}

// === Tag/Node Information ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Trimmed, whitespace-collapsed text of a selection.
#[must_use]
pub fn clean_text(sel: &Selection) -> String {
    sel.text().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Parse an HTML string.
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Elements that never contribute visible text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// Elements that start a new line when flattened.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Flatten a selection to text, one line per block element.
///
/// Script, style and template contents are skipped. Runs of spaces are
/// collapsed inside each line and empty lines are dropped.
#[must_use]
pub fn block_text(sel: &Selection) -> String {
    let mut raw = String::new();
    for node in sel.nodes() {
        push_block_text(node, &mut raw);
    }

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_block_text(node: &NodeRef, out: &mut String) {
    if node.is_text() {
        out.push_str(&node.text());
        return;
    }

    let tag = node
        .node_name()
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_default();

    if SKIPPED_TAGS.contains(&tag.as_str()) {
        return;
    }

    let is_block = BLOCK_TAGS.contains(&tag.as_str());
    if is_block {
        out.push('\n');
    }
    for child in node.children() {
        push_block_text(&child, out);
    }
    if is_block {
        out.push('\n');
    }
}
