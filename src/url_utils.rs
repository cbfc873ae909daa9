//! URL Utility Functions
//!
//! Source URL normalization, image URL resolution against the page URL,
//! hostname handling for the site registry, and direct-image detection.

use url::Url;

use crate::error::{Error, Result};

/// Image file extensions that mark a URL as a direct image resource.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "bmp"];

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Trim the raw input and add `https://` when no scheme is present.
#[must_use]
pub fn normalize_source_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{trimmed}")
    }
}

/// Normalize and parse a page URL for fetching.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] when the normalized input does not parse
/// or has no host.
pub fn parse_source_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(&normalize_source_url(raw)).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Resolve an image reference found on a page to an absolute URL.
///
/// - protocol-relative (`//cdn/a.jpg`) gets `https:`
/// - absolute URLs are returned unchanged
/// - anything else is joined onto `base`
///
/// Returns `None` for empty input, data URIs, or when no base is available
/// for a relative reference.
#[must_use]
pub fn resolve_url(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") || raw.starts_with("javascript:") {
        return None;
    }

    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    let (is_abs, _) = is_absolute_url(raw);
    if is_abs {
        return Some(raw.to_string());
    }

    base.and_then(|b| b.join(raw).ok()).map(|u| u.to_string())
}

/// Lowercased hostname without a leading `www.`.
#[must_use]
pub fn normalized_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| {
        let h = h.trim_end_matches('.').to_ascii_lowercase();
        h.strip_prefix("www.").unwrap_or(&h).to_string()
    })
}

/// Whether `host` equals `domain` or is a subdomain of it.
#[must_use]
pub fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Whether the URL's path (or a format query parameter) names an image resource.
#[must_use]
pub fn is_direct_image_url(raw: &str) -> bool {
    let normalized = normalize_source_url(raw);
    let Ok(url) = Url::parse(&normalized) else {
        return false;
    };

    let path = url.path().to_ascii_lowercase();
    if let Some((_, ext)) = path.rsplit_once('.') {
        if IMAGE_EXTENSIONS.contains(&ext) {
            return true;
        }
    }

    url.query_pairs().any(|(k, v)| {
        matches!(k.as_ref(), "format" | "fm")
            && IMAGE_EXTENSIONS.contains(&v.to_ascii_lowercase().as_str())
    })
}

/// The page URL after normalization, parsed once for the whole run.
#[derive(Debug, Clone)]
pub struct SourceUrl {
    raw: String,
    parsed: Option<Url>,
    host: Option<String>,
}

impl SourceUrl {
    /// Normalize and parse a user-supplied URL. Never fails: an unparseable
    /// input keeps its raw form and simply has no host.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let raw = normalize_source_url(raw);
        let parsed = Url::parse(&raw).ok();
        let host = parsed.as_ref().and_then(normalized_host);
        Self { raw, parsed, host }
    }

    /// Normalized URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed URL, when the input was parseable.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.parsed.as_ref()
    }

    /// Host without `www.`.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Lowercased path plus query, the part of the URL that names the product.
    #[must_use]
    pub fn path_lower(&self) -> String {
        match &self.parsed {
            Some(url) => {
                let mut out = url.path().to_lowercase();
                if let Some(q) = url.query() {
                    out.push('?');
                    out.push_str(&q.to_lowercase());
                }
                out
            }
            None => self.raw.to_lowercase(),
        }
    }

    /// Whole URL lowercased.
    #[must_use]
    pub fn lower(&self) -> String {
        self.raw.to_lowercase()
    }
}
