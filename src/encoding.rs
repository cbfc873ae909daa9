//! Character encoding detection and transcoding.
//!
//! Product pages still show up in legacy charsets. The charset declared in
//! the HTTP `Content-Type` header wins, then the document's own meta tags,
//! then UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;/]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// `charset=` parameter of an HTTP header value.
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Encoding named by an HTTP `Content-Type` header value, if recognized.
#[must_use]
pub fn encoding_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    HEADER_CHARSET_RE
        .captures(content_type)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Detect character encoding from HTML bytes.
///
/// Looks for charset declarations in the following order:
/// 1. `<meta http-equiv="Content-Type" content="...; charset=...">`
/// 2. `<meta charset="...">`
/// 3. Defaults to UTF-8 if no declaration found
///
/// Only examines the first 1024 bytes.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = &html[..html.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    let declared = CONTENT_TYPE_CHARSET_RE
        .captures(&head_str)
        .or_else(|| CHARSET_META_RE.captures(&head_str))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()));

    declared.unwrap_or(UTF_8)
}

/// Transcode HTML bytes to a UTF-8 string.
///
/// `content_type` is the HTTP header value, when the bytes came over HTTP.
/// Invalid sequences become U+FFFD rather than failing.
///
/// # Examples
///
/// ```
/// use petfood_extract::encoding::transcode_to_utf8;
///
/// let html = b"<html><body>Chicken Meal, Brown Rice</body></html>";
/// let utf8_str = transcode_to_utf8(html, Some("text/html; charset=utf-8"));
/// assert!(utf8_str.contains("Chicken Meal"));
/// ```
#[must_use]
pub fn transcode_to_utf8(html: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(encoding_from_content_type)
        .unwrap_or_else(|| detect_encoding(html));

    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(html);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_utf8_from_meta_charset() {
        let html = br#"<html><head><meta charset="utf-8"></head><body>Test</body></html>"#;
        assert_eq!(detect_encoding(html), UTF_8);
    }

    #[test]
    fn detect_iso88591_from_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detect_charset_from_http_equiv() {
        let html = br#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1"></head><body>Test</body></html>"#;
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn default_to_utf8_when_no_charset() {
        assert_eq!(detect_encoding(b"<html><body>Test</body></html>"), UTF_8);
    }

    #[test]
    fn header_charset_beats_meta() {
        // "P\xe2t\xe9" is "Pâté" in windows-1252
        let html = b"<html><head><meta charset=\"utf-8\"></head><body>P\xe2t\xe9</body></html>";
        let text = transcode_to_utf8(html, Some("text/html; charset=windows-1252"));
        assert!(text.contains("Pâté"));
    }

    #[test]
    fn transcode_windows1252_from_meta() {
        let html = b"<html><head><meta charset=\"windows-1252\"></head><body>Caf\xe9</body></html>";
        let text = transcode_to_utf8(html, None);
        assert!(text.contains("Café"));
    }

    #[test]
    fn unknown_header_charset_falls_back_to_document() {
        assert!(encoding_from_content_type("text/html; charset=x-bogus").is_none());
        assert!(encoding_from_content_type("text/html").is_none());
        let text = transcode_to_utf8(b"<p>Salmon</p>", Some("text/html; charset=x-bogus"));
        assert_eq!(text, "<p>Salmon</p>");
    }
}
