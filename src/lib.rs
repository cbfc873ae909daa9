//! # petfood-extract
//!
//! Multi-strategy product attribute extraction for pet-food product pages.
//!
//! Given a page's HTML and its URL, the engine resolves brand, name, size,
//! image, pet type, texture, life stage, ingredients, guaranteed analysis
//! and calorie content. Each field runs its own ordered chain of
//! independent strategies; the first validated candidate wins, and an
//! exhausted chain degrades to a documented sentinel instead of an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use petfood_extract::extract;
//!
//! let html = r#"<html><head><title>Blue Buffalo Life Protection Adult Dog Food</title>
//! <meta property="og:image" content="/p.jpg"></head>
//! <body><p>Ingredients: Chicken, Chicken Meal, Rice, Vitamin E Supplement.</p></body></html>"#;
//!
//! let record = extract(html, "https://x.com/blue-dry-dog");
//! assert_eq!(record.brand, "Blue Buffalo");
//! assert_eq!(record.image_url, "https://x.com/p.jpg");
//! assert_eq!(record.texture, "dry");
//! ```
//!
//! ## Features
//!
//! - **Strategy chains**: meta tags, JSON-LD, DOM heuristics, lexicon
//!   lookups and raw-markup scans, tried in a fixed order per field
//! - **Site plug-ins**: per-domain strategies, image rewrites and
//!   rendering requirements in a [`SiteRegistry`]
//! - **Escalation**: an optional [`Escalator`] renders pages that hide
//!   their ingredients or nutrition behind client-side disclosures
//! - **Replaceable lexicon**: brand, ingredient and texture vocabularies
//!   load from JSON

mod error;
mod extract;
mod options;
mod result;

/// Regexes and selectors shared by the field extractors.
pub mod patterns;

/// DOM helpers over `dom_query`.
pub mod dom;

/// The parsed page handed to the engine.
pub mod document;

/// Unvalidated strategy output.
pub mod candidate;

/// Strategy chains and the per-run extraction context.
pub mod chain;

/// Field extractors: brand, image, name/size, classifiers, ingredients, nutrition.
pub mod fields;

/// Text normalization for matching and cleanup.
pub mod normalize;

/// Vocabulary tables.
pub mod lexicon;

/// Structural checks on candidates.
pub mod validators;

/// Meta tag collection.
pub mod meta;

/// JSON-LD product collection.
pub mod json_ld;

/// Per-domain plug-ins.
pub mod sites;

/// Rendered-DOM escalation through a pooled browser session.
pub mod escalation;

/// URL utilities for validation, resolution, and normalization.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Append-only JSON record store.
pub mod store;

/// Blocking HTTP fetcher.
#[cfg(feature = "fetch")]
pub mod fetch;

// Public API - re-exports
pub use document::FetchedDocument;
pub use error::{Error, FetchError, Result};
pub use escalation::{BrowserSession, DisclosurePlan, Escalator, SessionFactory, SessionPool};
pub use extract::Extractor;
pub use lexicon::Lexicon;
pub use options::Options;
pub use result::{
    CaloricInfo, ExtractionTrace, Field, LifeStage, PartialRecord, PetType, ProductRecord, Texture,
    BRAND_NOT_FOUND, IMAGE_NOT_FOUND, INGREDIENTS_NOT_AVAILABLE, INGREDIENTS_NOT_AVAILABLE_FOR_IMAGE,
    NONE_SUCCESSFUL,
};
pub use sites::SiteRegistry;
pub use store::{JsonStore, StoredRecord};

/// Extracts a product record from an HTML document using default options.
///
/// Never fails: every field the page does not yield carries its sentinel.
///
/// # Example
///
/// ```rust
/// use petfood_extract::{extract, BRAND_NOT_FOUND};
///
/// let record = extract("<html><body></body></html>", "example.com/item");
/// assert_eq!(record.source_url, "https://example.com/item");
/// assert_eq!(record.brand, BRAND_NOT_FOUND);
/// ```
#[must_use]
pub fn extract(html: &str, source_url: &str) -> ProductRecord {
    extract_with_options(html, source_url, &Options::default())
}

/// Extracts a product record with custom options.
///
/// # Example
///
/// ```rust
/// use petfood_extract::{extract_with_options, Options};
///
/// let html = "<html><head><title>Acana Wild Prairie 25 lb</title></head></html>";
/// let options = Options {
///     combine_name_and_size: false,
///     ..Options::default()
/// };
/// let record = extract_with_options(html, "https://example.com/p", &options);
/// assert_eq!(record.size.as_deref(), Some("25lb"));
/// assert!(!record.name.unwrap_or_default().contains("(25lb)"));
/// ```
#[must_use]
pub fn extract_with_options(html: &str, source_url: &str, options: &Options) -> ProductRecord {
    let doc = FetchedDocument::parse(html);
    Extractor::new()
        .with_options(options.clone())
        .extract(&doc, source_url)
}

/// Extracts a product record from raw bytes with charset detection.
///
/// The charset comes from the `Content-Type` header when given, then from
/// `<meta charset>` or `http-equiv`, defaulting to UTF-8. Invalid bytes are
/// replaced rather than rejected.
///
/// # Example
///
/// ```rust
/// use petfood_extract::extract_bytes;
///
/// let html = b"<html><head><title>Caf\xE9 Chicken Kibble</title></head></html>";
/// let record = extract_bytes(html, Some("text/html; charset=iso-8859-1"), "https://example.com/p");
/// assert_eq!(record.name.as_deref(), Some("Café Chicken Kibble"));
/// ```
#[must_use]
pub fn extract_bytes(html: &[u8], content_type: Option<&str>, source_url: &str) -> ProductRecord {
    let doc = FetchedDocument::from_bytes(html, content_type);
    Extractor::new().extract(&doc, source_url)
}

/// Reduced record for a direct image URL, derived from the URL alone.
///
/// # Example
///
/// ```rust
/// use petfood_extract::{extract_from_url_only, PetType};
///
/// let partial = extract_from_url_only("https://cdn.example.com/friskies-kitten-pate.png");
/// assert_eq!(partial.brand, "Purina Friskies");
/// assert_eq!(partial.pet_type, PetType::Cat);
/// ```
#[must_use]
pub fn extract_from_url_only(source_url: &str) -> PartialRecord {
    Extractor::new().extract_from_url_only(source_url)
}
