//! Brand extraction.
//!
//! Structured sources first (meta, JSON-LD), then DOM hints, then free
//! text, then lexicon matches against the title and URL. The winner is
//! normalized: doubled names collapsed, compound spellings spaced, known
//! brands given their canonical casing and the Friskies/Purina pairing
//! applied.

use crate::chain::{run_chain, ExtractionContext, Strategy};
use crate::candidate::Candidate;
use crate::dom::{self, Selection};
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::normalize;
use crate::patterns::{BRAND_CLASS_SELECTOR, BRAND_LABEL, CAMEL_BOUNDARY};
use crate::result::{Field, BRAND_NOT_FOUND};
use crate::validators::is_plausible_brand;

use super::{meta_candidate, text_candidate};

/// Generic brand strategies, highest priority first.
pub const STRATEGIES: &[Strategy] = &[
    Strategy::new("meta_tags", from_meta),
    Strategy::new("json_ld", from_json_ld),
    Strategy::new("brand_class", from_brand_class),
    Strategy::new("brand_label", from_brand_label),
    Strategy::new("title_lexicon", from_title),
    Strategy::new("url_lexicon", from_url),
];

/// Resolved brand and the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandOutcome {
    pub brand: String,
    pub strategy: &'static str,
}

/// Run the brand chain (site plug-ins first) and normalize the winner.
#[must_use]
pub fn extract(ctx: &ExtractionContext<'_>) -> BrandOutcome {
    let mut strategies = ctx.sites.strategies_for(ctx.host(), Field::Brand);
    strategies.extend_from_slice(STRATEGIES);

    let outcome = run_chain(Field::Brand, &strategies, ctx, |c| {
        is_plausible_brand(c.trimmed(), ctx.lexicon)
    });

    let brand = outcome.value().map_or_else(
        || BRAND_NOT_FOUND.to_string(),
        |raw| postprocess(raw, &ctx.source.lower(), ctx.lexicon),
    );

    BrandOutcome {
        brand,
        strategy: outcome.strategy,
    }
}

/// Brand from the URL alone, for the direct-image path.
#[must_use]
pub fn from_url_only(url_lower: &str, lexicon: &Lexicon) -> (String, &'static str) {
    match lexicon.find_brand_in_url(url_lower) {
        Some(brand) => (postprocess(brand, url_lower, lexicon), "url_lexicon"),
        None => (BRAND_NOT_FOUND.to_string(), crate::result::NONE_SUCCESSFUL),
    }
}

/// Normalize an accepted brand candidate.
#[must_use]
pub fn postprocess(raw: &str, source_lower: &str, lexicon: &Lexicon) -> String {
    let collapsed = collapse_doubled(&normalize::clean(raw));
    let spaced = space_compound(&collapsed, lexicon);
    apply_friskies_rule(&spaced, source_lower)
}

/// `"Pet HonestyPet Honesty"` → `"Pet Honesty"`. Other values are returned trimmed.
#[must_use]
pub fn collapse_doubled(value: &str) -> String {
    let value = value.trim();
    let chars: Vec<char> = value.chars().collect();
    let n = chars.len();

    if n >= 4 && n % 2 == 0 && chars[..n / 2] == chars[n / 2..] {
        return chars[..n / 2].iter().collect();
    }
    // Same name twice around a single separator.
    if n >= 5 && n % 2 == 1 && chars[n / 2].is_whitespace() && chars[..n / 2] == chars[n / 2 + 1..] {
        return chars[..n / 2].iter().collect();
    }
    value.to_string()
}

/// Known brands get canonical casing. Unknown run-together spellings are
/// looked up in the compound table, then split at a single camelCase
/// boundary when both halves have at least three characters.
#[must_use]
pub fn space_compound(brand: &str, lexicon: &Lexicon) -> String {
    if let Some(canonical) = lexicon.canonical_brand(brand) {
        return canonical.to_string();
    }
    if let Some(spaced) = lexicon.compound_brand(brand) {
        return spaced.to_string();
    }
    if let Some(recased) = recase_shouting(brand, lexicon) {
        return recased;
    }

    let boundaries: Vec<usize> = CAMEL_BOUNDARY.find_iter(brand).map(|m| m.start() + 1).collect();
    if let [split] = boundaries.as_slice() {
        let (left, right) = brand.split_at(*split);
        if left.chars().count() >= 3 && right.chars().count() >= 3 && !left.ends_with(' ') {
            return format!("{left} {right}");
        }
    }
    brand.to_string()
}

/// `"PURINA FRISKIES"` → `"Purina Friskies"`. Words that are known brands
/// take their canonical casing; the rest are title-cased. Short all-caps
/// values (`"K9"`, `"NOW"`) are left alone.
fn recase_shouting(brand: &str, lexicon: &Lexicon) -> Option<String> {
    let letters = brand.chars().filter(|c| c.is_alphabetic()).count();
    if letters < 4 || brand.chars().any(char::is_lowercase) {
        return None;
    }

    let words: Vec<String> = brand
        .split_whitespace()
        .map(|word| match lexicon.canonical_brand(word) {
            Some(canonical) => canonical.to_string(),
            None => {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                })
            }
        })
        .collect();
    Some(words.join(" "))
}

/// Friskies is a Purina line: `"Friskies"` → `"Purina Friskies"`, and a
/// bare `"Purina"` on a Friskies URL → `"Purina Friskies"`. Idempotent.
#[must_use]
pub fn apply_friskies_rule(brand: &str, source_lower: &str) -> String {
    let lower = brand.to_lowercase();
    if lower.contains("friskies") && !lower.contains("purina") {
        return format!("Purina {brand}");
    }
    if lower == "purina" && source_lower.contains("friskies") {
        return "Purina Friskies".to_string();
    }
    brand.to_string()
}

fn from_meta(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    if let Some(value) = ctx.meta().first(&["product:brand", "brand", "og:brand"]) {
        return meta_candidate(Some(value.to_string()), "meta_tags");
    }

    let itemprop = ctx.doc.select("[itemprop='brand']");
    if itemprop.is_empty() {
        return Ok(None);
    }
    let first = itemprop.first();
    let value = dom::first_attribute(&first, &["content"]).or_else(|| {
        let named = first.select("[itemprop='name']");
        let text = if named.is_empty() {
            dom::clean_text(&first)
        } else {
            dom::clean_text(&named)
        };
        (!text.is_empty()).then_some(text)
    });
    meta_candidate(value, "meta_tags")
}

fn from_json_ld(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    meta_candidate(ctx.json_ld().brand(), "json_ld")
}

fn from_brand_class(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    for node in ctx.doc.select(BRAND_CLASS_SELECTOR).nodes() {
        let el = Selection::from(*node);
        let text = dom::clean_text(&el);
        if text.is_empty() || text.chars().count() > 60 {
            continue;
        }
        let text = strip_brand_prefix(&text);
        if is_plausible_brand(text, ctx.lexicon) {
            return text_candidate(Some(text.to_string()), "brand_class");
        }
    }
    Ok(None)
}

fn from_brand_label(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = BRAND_LABEL
        .captures(ctx.doc.text())
        .and_then(|caps| caps.name("brand"))
        .map(|m| m.as_str().trim().to_string());
    text_candidate(value, "brand_label")
}

fn from_title(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let title = ctx
        .doc
        .title()
        .or_else(|| ctx.meta().first(&["og:title"]).map(str::to_string))
        .unwrap_or_default();
    text_candidate(ctx.lexicon.find_brand(&title).map(str::to_string), "title_lexicon")
}

fn from_url(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let url = ctx.source.lower();
    text_candidate(ctx.lexicon.find_brand_in_url(&url).map(str::to_string), "url_lexicon")
}

fn strip_brand_prefix(text: &str) -> &str {
    let trimmed = text.trim();
    for prefix in ["brand:", "brand ", "by "] {
        let head = trimmed.get(..prefix.len());
        if head.is_some_and(|h| h.eq_ignore_ascii_case(prefix)) && trimmed.len() > prefix.len() {
            return trimmed[prefix.len()..].trim_start_matches([':', ' ']).trim();
        }
    }
    trimmed
}
