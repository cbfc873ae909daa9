//! Product image extraction.
//!
//! Strategies run from the most specific (`<img>` elements that look like
//! the product shot) down to regex scans of the raw markup. The winner is
//! resolved to an absolute URL and passed through the site's image
//! rewrites.

use crate::candidate::Candidate;
use crate::chain::{run_chain, ExtractionContext, Strategy};
use crate::dom::{self, Selection};
use crate::error::Result;
use crate::patterns::{
    ANY_IMAGE_URL, CDN_IMAGE_URL, CSS_BACKGROUND, IMAGE_NOISE, IMAGE_PRODUCT, OG_IMAGE_PREFERRED,
    RAW_OG_IMAGE, RAW_OG_IMAGE_REVERSED, SCRIPT_IMAGE_URL, THUMBNAIL_PATH,
};
use crate::result::{Field, IMAGE_NOT_FOUND};
use crate::url_utils::resolve_url;
use crate::validators::is_plausible_image_ref;

use super::{image_candidate, meta_candidate};

/// Minimum length of an `<img>` source worth considering.
const MIN_SRC_LEN: usize = 15;

/// Declared dimensions below this are icons or tracking pixels.
const MIN_DIMENSION: u32 = 50;

const SRC_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

pub const STRATEGIES: &[Strategy] = &[
    Strategy::new("product_img", product_img),
    Strategy::new("json_ld", from_json_ld),
    Strategy::new("og_image", og_image),
    Strategy::new("product_meta", product_meta),
    Strategy::new("any_img", any_img),
    Strategy::new("css_background", css_background),
    Strategy::new("script_scan", script_scan),
    Strategy::new("cdn_scan", cdn_scan),
    Strategy::new("raw_og_image", raw_og_image),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutcome {
    pub url: String,
    pub strategy: &'static str,
}

/// Run the image chain, resolve the winner and apply site rewrites.
#[must_use]
pub fn extract(ctx: &ExtractionContext<'_>) -> ImageOutcome {
    let mut strategies = ctx.sites.strategies_for(ctx.host(), Field::Image);
    strategies.extend_from_slice(STRATEGIES);

    let base = ctx.source.url();
    let outcome = run_chain(Field::Image, &strategies, ctx, |c| {
        is_plausible_image_ref(c.trimmed()) && resolve_url(c.trimmed(), base).is_some()
    });

    let url = outcome
        .value()
        .and_then(|raw| resolve_url(raw, base))
        .map_or_else(
            || IMAGE_NOT_FOUND.to_string(),
            |resolved| ctx.sites.rewrite_image(ctx.host(), resolved),
        );

    ImageOutcome {
        url,
        strategy: outcome.strategy,
    }
}

/// Source of an `<img>`: the first populated source attribute, else the
/// first `srcset` entry.
fn img_source(img: &Selection) -> Option<String> {
    dom::first_attribute(img, SRC_ATTRIBUTES).or_else(|| {
        dom::first_attribute(img, &["srcset", "data-srcset"])
            .and_then(|set| set.split(',').next().map(str::to_string))
            .and_then(|entry| entry.split_whitespace().next().map(str::to_string))
    })
}

fn declared_too_small(img: &Selection) -> bool {
    ["width", "height"].iter().any(|attr| {
        dom::get_attribute(img, attr)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<u32>().ok())
            .is_some_and(|v| v < MIN_DIMENSION)
    })
}

fn is_noise(text: &str) -> bool {
    IMAGE_NOISE.is_match(text)
}

fn product_img(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let mut fallback = None;

    for node in ctx.doc.select("img").nodes() {
        let img = Selection::from(*node);
        let Some(src) = img_source(&img) else {
            continue;
        };
        if src.starts_with("data:") || src.len() < MIN_SRC_LEN {
            continue;
        }
        let fingerprint = dom::attribute_fingerprint(&img);
        if is_noise(&src) || is_noise(&fingerprint) || THUMBNAIL_PATH.is_match(&src) {
            continue;
        }
        if declared_too_small(&img) {
            continue;
        }

        if IMAGE_PRODUCT.is_match(&src) || IMAGE_PRODUCT.is_match(&fingerprint) {
            return image_candidate(Some(src), "product_img");
        }
        fallback.get_or_insert(src);
    }

    image_candidate(fallback, "product_img")
}

fn from_json_ld(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    meta_candidate(ctx.json_ld().image(), "json_ld")
}

fn og_image(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let meta = ctx.meta();
    let mut images = meta.all("og:image");
    images.extend(meta.all("og:image:url"));
    images.extend(meta.all("og:image:secure_url"));

    let best = images
        .iter()
        .find(|url| OG_IMAGE_PREFERRED.is_match(url))
        .or_else(|| images.first())
        .map(|s| (*s).to_string());
    meta_candidate(best, "og_image")
}

fn product_meta(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx
        .meta()
        .first(&["product:image", "twitter:image", "twitter:image:src"])
        .map(str::to_string);
    meta_candidate(value, "product_meta")
}

fn any_img(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx.doc.select("img").nodes().iter().find_map(|node| {
        let img = Selection::from(*node);
        img_source(&img).filter(|src| !src.starts_with("data:") && !declared_too_small(&img))
    });
    image_candidate(value, "any_img")
}

fn css_background(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let mut sources: Vec<String> = ctx
        .doc
        .select("[style]")
        .nodes()
        .iter()
        .filter_map(|node| dom::get_attribute(&Selection::from(*node), "style"))
        .collect();
    sources.extend(
        ctx.doc
            .select("style")
            .nodes()
            .iter()
            .map(|node| dom::text_content(&Selection::from(*node)).to_string()),
    );

    let value = sources.iter().find_map(|css| {
        CSS_BACKGROUND
            .captures_iter(css)
            .filter_map(|caps| caps.name("url"))
            .map(|m| m.as_str().trim().to_string())
            .find(|url| !url.starts_with("data:") && !is_noise(url))
    });
    image_candidate(value, "css_background")
}

fn script_scan(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let value = ctx.doc.select("script").nodes().iter().find_map(|node| {
        let text = dom::text_content(&Selection::from(*node));
        SCRIPT_IMAGE_URL
            .find_iter(&text)
            .map(|m| m.as_str().replace("\\/", "/"))
            .find(|url| !is_noise(url) && !THUMBNAIL_PATH.is_match(url))
    });
    image_candidate(value, "script_scan")
}

fn cdn_scan(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let html = ctx.doc.html();
    let value = CDN_IMAGE_URL
        .find_iter(html)
        .chain(ANY_IMAGE_URL.find_iter(html))
        .map(|m| m.as_str().to_string())
        .find(|url| !is_noise(url) && !THUMBNAIL_PATH.is_match(url));
    image_candidate(value, "cdn_scan")
}

fn raw_og_image(ctx: &ExtractionContext<'_>) -> Result<Option<Candidate>> {
    let html = ctx.doc.html();
    let value = RAW_OG_IMAGE
        .captures(html)
        .or_else(|| RAW_OG_IMAGE_REVERSED.captures(html))
        .and_then(|caps| caps.name("url"))
        .map(|m| m.as_str().to_string());
    image_candidate(value, "raw_og_image")
}
