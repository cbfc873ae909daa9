//! The fetched document handed to the extraction engine.
//!
//! Bundles the raw markup, its parsed tree, a block-aware text rendering
//! and, optionally, markup captured from a JavaScript-rendered page.

use crate::dom::{self, Document, Selection};
use crate::encoding;

/// Parsed HTML plus derived text, ready for extraction.
pub struct FetchedDocument {
    html: String,
    dom: Document,
    text: String,
    rendered_html: Option<String>,
}

impl FetchedDocument {
    /// Parse a UTF-8 HTML string.
    #[must_use]
    pub fn parse(html: impl Into<String>) -> Self {
        let html = html.into();
        let dom = dom::parse(&html);
        let text = page_text(&dom);
        Self {
            html,
            dom,
            text,
            rendered_html: None,
        }
    }

    /// Decode raw bytes (HTTP `Content-Type` first, then meta charset) and parse.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], content_type: Option<&str>) -> Self {
        Self::parse(encoding::transcode_to_utf8(bytes, content_type))
    }

    /// Attach markup captured from a rendered page.
    ///
    /// The engine consults it when the static markup yields no ingredients
    /// or a suspicious list, for any domain.
    #[must_use]
    pub fn with_rendered_html(mut self, rendered: impl Into<String>) -> Self {
        self.rendered_html = Some(rendered.into());
        self
    }

    /// Raw markup.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Parsed tree.
    #[must_use]
    pub fn dom(&self) -> &Document {
        &self.dom
    }

    /// Visible body text, one line per block element.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caller-supplied rendered markup, if any.
    #[must_use]
    pub fn rendered_html(&self) -> Option<&str> {
        self.rendered_html.as_deref()
    }

    /// Whitespace-collapsed `<title>` text.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        let title = dom::clean_text(&self.dom.select("title"));
        (!title.is_empty()).then_some(title)
    }

    /// Number of `<img>` elements.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.dom.select("img").length()
    }

    /// Shorthand for `self.dom().select(selector)`.
    #[must_use]
    pub fn select(&self, selector: &str) -> Selection<'_> {
        self.dom.select(selector)
    }
}

impl std::fmt::Debug for FetchedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedDocument")
            .field("html_len", &self.html.len())
            .field("text_len", &self.text.len())
            .field("rendered", &self.rendered_html.is_some())
            .finish_non_exhaustive()
    }
}

fn page_text(doc: &Document) -> String {
    let body = doc.select("body");
    if body.is_empty() {
        dom::block_text(&doc.select("html"))
    } else {
        dom::block_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_excludes_head_and_scripts() {
        let doc = FetchedDocument::parse(
            "<html><head><title>Friskies Pate</title></head>\
             <body><h1>Friskies Pate</h1><script>var a = 1;</script><p>Ingredients: Water</p></body></html>",
        );
        assert_eq!(doc.text(), "Friskies Pate\nIngredients: Water");
        assert_eq!(doc.title().as_deref(), Some("Friskies Pate"));
        assert!(doc.rendered_html().is_none());
    }

    #[test]
    fn rendered_html_is_kept() {
        let doc = FetchedDocument::parse("<p>x</p>").with_rendered_html("<p>Ingredients: Tuna</p>");
        assert_eq!(doc.rendered_html(), Some("<p>Ingredients: Tuna</p>"));
    }

    #[test]
    fn counts_images() {
        let doc = FetchedDocument::parse(r#"<body><img src="/a.jpg"><img src="/b.jpg"></body>"#);
        assert_eq!(doc.image_count(), 2);
    }
}
