//! Product name and package size.

use crate::candidate::Candidate;
use crate::chain::{run_chain, ExtractionContext, Strategy};
use crate::dom::{self, Selection};
use crate::error::{Error, Result};
use crate::normalize;
use crate::patterns::{PACK_COUNT, PRODUCT_TITLE_SELECTOR, SIZE, SIZE_SELECTOR, TITLE_RETAILER_SUFFIX};
use crate::result::Field;
use crate::validators::is_plausible_name;

use super::{meta_candidate, text_candidate};

pub const NAME_STRATEGIES: &[Strategy] = &[
    Strategy::new("json_ld", name_from_json_ld),
    Strategy::new("og_title", name_from_og_title),
    Strategy::new("heading", name_from_heading),
    Strategy::new("title", name_from_title),
];

pub const SIZE_STRATEGIES: &[Strategy] = &[
    Strategy::new("json_ld", size_from_json_ld),
    Strategy::new("name", size_from_name),
    Strategy::new("size_element", size_from_dom),
    Strategy::new("page_text", size_from_text),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameOutcome {
    /// Name as found, without the size suffix.
    pub name: Option<String>,
    pub name_strategy: &'static str,
    pub size: Option<String>,
    pub size_strategy: &'static str,
}

impl NameOutcome {
    /// `"Name (Size)"` when both are known and the name lacks the suffix already.
    #[must_use]
    pub fn display_name(&self, combine_with_size: bool) -> Option<String> {
        let name = self.name.as_ref()?;
        match (&self.size, combine_with_size) {
            (Some(size), true) if !name.ends_with(&format!("({size})")) => {
                Some(format!("{name} ({size})"))
            }
            _ => Some(name.clone()),
        }
    }
}

#[must_use]
pub fn extract(ctx: &ExtractionContext<'_>) -> NameOutcome {
    let mut name_chain = ctx.sites.strategies_for(ctx.host(), Field::Name);
    name_chain.extend_from_slice(NAME_STRATEGIES);
    let name = run_chain(Field::Name, &name_chain, ctx, |c| is_plausible_name(c.trimmed(), ctx.lexicon));

    let mut size_chain = ctx.sites.strategies_for(ctx.host(), Field::Size);
    size_chain.extend_from_slice(SIZE_STRATEGIES);
    let size = run_chain(Field::Size, &size_chain, ctx, |c| normalize_size(c.trimmed()).is_some());

    NameOutcome {
        name: name.value().map(normalize::clean),
        name_strategy: name.strategy,
        size: size.value().and_then(normalize_size),
        size_strategy: size.strategy,
    }
}

/// Normalize a size mention to `"30lb"`, `"5.5oz"` or `"12x3oz"`.
///
/// The first quantity+unit in `text` is used. A pack count may come
/// before it (`12 x 3 oz`) or after it (`3 oz, case of 12`).
#[must_use]
pub fn normalize_size(text: &str) -> Option<String> {
    let caps = SIZE.captures(text)?;
    let qty = caps.name("qty")?.as_str();
    let unit = canonical_unit(caps.name("unit")?.as_str())?;

    let qty = qty
        .parse::<f64>()
        .ok()
        .filter(|q| *q > 0.0)
        .map(|_| trim_decimal(qty))?;

    let count = caps.name("count").map(|m| m.as_str().to_string()).or_else(|| {
        let rest = &text[caps.get(0).map_or(0, |m| m.end())..];
        PACK_COUNT
            .captures(rest)
            .and_then(|c| c.name("count").or_else(|| c.name("count2")))
            .map(|m| m.as_str().to_string())
    });

    match count.filter(|c| c != "1") {
        Some(count) => Some(format!("{count}x{qty}{unit}")),
        None => Some(format!("{qty}{unit}")),
    }
}

fn canonical_unit(unit: &str) -> Option<&'static str> {
    let unit = unit.to_lowercase();
    let unit = unit.trim_end_matches('.');
    if unit.starts_with("lb") || unit.starts_with("pound") {
        Some("lb")
    } else if unit.contains("oz") || unit.starts_with("ounce") {
        Some("oz")
    } else if unit.starts_with("kg") || unit.starts_with("kilogram") {
        Some("kg")
    } else if unit == "g" || unit.starts_with("gram") {
        Some("g")
    } else {
        None
    }
}

/// `"30.0"` → `"30"`, `"5.50"` → `"5.5"`.
fn trim_decimal(qty: &str) -> String {
    if qty.contains('.') {
        qty.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        qty.to_string()
    }
}

/// Page title without retailer suffixes.
#[must_use]
pub fn clean_title(title: &str) -> String {
    let title = normalize::clean(title);
    TITLE_RETAILER_SUFFIX.replace(&title, "").trim().to_string()
}

fn name_from_json_ld(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    meta_candidate(ctx.json_ld().product_name(), "json_ld")
}

fn name_from_og_title(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx.meta().first(&["og:title", "twitter:title"]).map(clean_title);
    meta_candidate(value, "og_title")
}

fn name_from_heading(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx.doc.select(PRODUCT_TITLE_SELECTOR).nodes().iter().find_map(|node| {
        let text = dom::clean_text(&Selection::from(*node));
        (!text.is_empty()).then_some(text)
    });
    text_candidate(value, "heading")
}

fn name_from_title(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    text_candidate(ctx.doc.title().map(|t| clean_title(&t)), "title")
}

fn size_candidate(value: Option<String>, source: &'static str) -> Result<Option<Candidate>> {
    match value {
        Some(raw) => normalize_size(&raw)
            .map(|size| Some(Candidate::text(size, source)))
            .ok_or_else(|| Error::strategy(source, format!("no size in {raw:?}"))),
        None => Ok(None),
    }
}

fn size_from_json_ld(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    size_candidate(ctx.json_ld().product_size(), "json_ld")
}

fn size_from_name(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let name = ctx
        .json_ld()
        .product_name()
        .or_else(|| ctx.meta().first(&["og:title"]).map(str::to_string))
        .or_else(|| ctx.doc.title());
    match name {
        Some(name) if SIZE.is_match(&name) => size_candidate(Some(name), "name"),
        _ => Ok(None),
    }
}

fn size_from_dom(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx.doc.select(SIZE_SELECTOR).nodes().iter().find_map(|node| {
        let el = Selection::from(*node);
        let text = dom::first_attribute(&el, &["data-size", "content"])
            .unwrap_or_else(|| dom::clean_text(&el));
        SIZE.is_match(&text).then_some(text)
    });
    size_candidate(value, "size_element")
}

fn size_from_text(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx
        .doc
        .text()
        .lines()
        .take(200)
        .find(|line| line.len() < 120 && SIZE.is_match(line))
        .map(str::to_string);
    size_candidate(value, "page_text")
}
