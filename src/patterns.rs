//! Compiled regex patterns and CSS selectors for product-page extraction.
//!
//! All patterns are compiled once on first use using `LazyLock`.
//! Patterns are organized by the field that consumes them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Brand Patterns
// =============================================================================

/// `Brand: Acme` labels in free text. Captures up to the end of the line or a separator.
pub static BRAND_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\bbrand\s*:\s*(?P<brand>[^\n|,;:]{2,40})").expect("BRAND_LABEL regex")
});

/// "Shop all Acme" / "Show all Acme" / "View all Acme" link text.
pub static SHOP_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:shop|show|view)\s+all\s+(?P<brand>.+?)\s*$").expect("SHOP_ALL regex")
});

/// Single lower->Upper boundary inside a run-together brand (`PetHonesty`).
pub static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z][A-Z]").expect("CAMEL_BOUNDARY regex"));

// =============================================================================
// Name & Size Patterns
// =============================================================================

/// Quantity with unit, optionally preceded by a pack count (`12 x 3 oz`).
pub static SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?P<count>\d{1,3})\s*[x×]\s*)?\b(?P<qty>\d+(?:\.\d+)?)\s*-?\s*(?P<unit>lbs?|pounds?|fl\.?\s*oz|oz|ounces?|kg|kilograms?|g|grams?)\b\.?",
    )
    .expect("SIZE regex")
});

/// Pack count written after the size (`case of 24`, `12 count`, `6-pack`).
pub static PACK_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcase\s+of\s+(?P<count>\d{1,3})\b|\b(?P<count2>\d{1,3})\s*-?\s*(?:count|ct|pack|pk)\b")
        .expect("PACK_COUNT regex")
});

/// Retailer suffixes on page titles (`| Chewy`, `- Walmart.com`, `: Target`).
pub static TITLE_RETAILER_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[|:–—-]\s*(?:free shipping.*|chewy(?:\.com)?|petco|petsmart|target|walmart(?:\.com)?|amazon(?:\.com)?)\s*(?:[|:–—-].*)?$",
    )
    .expect("TITLE_RETAILER_SUFFIX regex")
});

// =============================================================================
// Image Patterns
// =============================================================================

/// Keywords marking non-product images in src/alt/class/id.
pub static IMAGE_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(logo|icon|\bnav|footer|sprite|badge|placeholder|spinner|loading|pixel|tracking|avatar|payment|flag|rating|stars?\b)")
        .expect("IMAGE_NOISE regex")
});

/// Keywords marking likely product images.
pub static IMAGE_PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(product|main|hero|primary|zoom|gallery|pdp|large|detail|packshot)")
        .expect("IMAGE_PRODUCT regex")
});

/// Thumbnail markers in an image path or query.
pub static THUMBNAIL_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)/(?:thumbs?|thumbnails?|swatch(?:es)?|icons?)/|[_-](?:thumb|thumbnail|xs|tiny)\.|_\d{2}x\d{2}\.|[?&](?:w|width|wid)=(?:[1-9]|[1-4]\d)(?:&|$)",
    )
    .expect("THUMBNAIL_PATH regex")
});

/// Size or product keywords that make an `og:image` preferable.
pub static OG_IMAGE_PREFERRED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(product|large|main|zoom|\b1\d{3}x|\b[2-9]\d{3}x|wid=\d{3,}|w=\d{3,})")
        .expect("OG_IMAGE_PREFERRED regex")
});

/// `background-image: url(...)` in inline styles and style blocks.
pub static CSS_BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;"]*?url\(\s*['"]?(?P<url>[^'")]+?)['"]?\s*\)"#)
        .expect("CSS_BACKGROUND regex")
});

/// Image URLs inside script text, tolerating JSON-escaped slashes.
pub static SCRIPT_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?:(?:\\?/){2}[^"'\s<>()\\]+(?:\\?/[^"'\s<>()\\]+)*?\.(?:jpe?g|png|webp)(?:\?[^"'\s<>()\\]*)?"#)
        .expect("SCRIPT_IMAGE_URL regex")
});

/// Image URLs served from CDN-like hosts anywhere in the markup.
pub static CDN_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?:)?//[^"'\s<>()]*(?:cdn|images?|media|static|assets|img)[^"'\s<>()]*\.(?:jpe?g|png|webp)(?:\?[^"'\s<>()]*)?"#)
        .expect("CDN_IMAGE_URL regex")
});

/// Any absolute image URL in the markup.
pub static ANY_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^"'\s<>()]+\.(?:jpe?g|png|webp)(?:\?[^"'\s<>()]*)?"#)
        .expect("ANY_IMAGE_URL regex")
});

/// `og:image` meta tag with `property` before `content`.
pub static RAW_OG_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+property\s*=\s*["']og:image(?::url)?["'][^>]*content\s*=\s*["'](?P<url>[^"']+)["']"#)
        .expect("RAW_OG_IMAGE regex")
});

/// `og:image` meta tag with `content` before `property`.
pub static RAW_OG_IMAGE_REVERSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+content\s*=\s*["'](?P<url>[^"']+)["'][^>]*property\s*=\s*["']og:image(?::url)?["']"#)
        .expect("RAW_OG_IMAGE_REVERSED regex")
});

/// Drupal image-style derivative segment.
pub static DRUPAL_IMAGE_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/styles/(?:social_share|thumbnail|medium|small)/public/")
        .expect("DRUPAL_IMAGE_STYLE regex")
});

// =============================================================================
// Ingredient Patterns
// =============================================================================

/// `Ingredients:` label opening a block.
pub static INGREDIENTS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bingredients?\s*[:\-]\s*").expect("INGREDIENTS_LABEL regex")
});

/// "Our ingredients" phrasing used by brand sites.
pub static OUR_INGREDIENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bour\s+ingredients\b\s*:?\s*").expect("OUR_INGREDIENTS regex")
});

/// `INGREDIENTS` alone on its line.
pub static INGREDIENTS_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*ingredients\s*:?\s*$").expect("INGREDIENTS_HEADING regex")
});

/// Label followed by one sentence ending in a period.
pub static INGREDIENTS_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bingredients?\s*(?::|-|\bare\b|\binclude\b)?\s*(?P<body>[A-Za-z][^.\n]{20,}?\.)(?:\s|$)")
        .expect("INGREDIENTS_SENTENCE regex")
});

/// Where an ingredient block stops: a nutrition keyword.
pub static INGREDIENTS_TERMINATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)guaranteed\s+analysis|calori(?:e|c)\s+content|feeding\s+(?:guidelines|instructions|directions)|nutritional\s+(?:info|information|statement|adequacy)|\baafco\b",
    )
    .expect("INGREDIENTS_TERMINATOR regex")
});

/// Where an ingredient block stops: an ALL-CAPS header line.
pub static ALL_CAPS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[A-Z][A-Z0-9 &/'().-]{3,}:?$").expect("ALL_CAPS_HEADER regex")
});

/// `"ingredients": "..."` in embedded JSON (Shopify metafields, Next.js data).
pub static EMBEDDED_JSON_INGREDIENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"ingredients"\s*:\s*"(?P<body>(?:[^"\\]|\\.){20,})""#)
        .expect("EMBEDDED_JSON_INGREDIENTS regex")
});

/// Two lowercase letters (or a closing paren) glued to a capitalized word:
/// a missing comma. `pH` and `DHA` never match; `Mc`/`Mac` prefixes are
/// filtered by the caller.
pub static RUN_TOGETHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]{2}|\))([A-Z][a-z])").expect("RUN_TOGETHER regex"));

/// Regulatory product codes that leak into ingredient lists (`N600123`).
pub static INGREDIENT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,2}-?\d{5,}$").expect("INGREDIENT_CODE regex"));

/// `Vitamins (` / `Minerals (` group openers.
pub static NUTRIENT_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:vitamins|minerals|trace minerals)\s*[:\[(]").expect("NUTRIENT_GROUP regex")
});

// =============================================================================
// Nutrition Patterns
// =============================================================================

/// Crude protein minimum.
pub static GA_PROTEIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:crude\s+)?protein\s*(?:\(\s*min(?:imum)?\.?\s*\)|min(?:imum)?\.?)?[\s:.]*?(?P<value>\d+(?:\.\d+)?)\s*%")
        .expect("GA_PROTEIN regex")
});

/// Crude fat minimum.
pub static GA_FAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:crude\s+)?fat\s*(?:\(\s*min(?:imum)?\.?\s*\)|min(?:imum)?\.?)?[\s:.]*?(?P<value>\d+(?:\.\d+)?)\s*%")
        .expect("GA_FAT regex")
});

/// Crude fiber maximum.
pub static GA_FIBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:crude\s+)?fib(?:er|re)\s*(?:\(\s*max(?:imum)?\.?\s*\)|max(?:imum)?\.?)?[\s:.]*?(?P<value>\d+(?:\.\d+)?)\s*%")
        .expect("GA_FIBER regex")
});

/// Moisture maximum.
pub static GA_MOISTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmoisture\s*(?:\(\s*max(?:imum)?\.?\s*\)|max(?:imum)?\.?)?[\s:.]*?(?P<value>\d+(?:\.\d+)?)\s*%")
        .expect("GA_MOISTURE regex")
});

/// Calories per kilogram, comma-grouped or plain.
pub static KCAL_PER_KG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<value>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s*kcal\s*(?:ME\s*)?/\s*kg\b")
        .expect("KCAL_PER_KG regex")
});

/// Calories per serving unit.
pub static KCAL_PER_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<value>\d{1,3}(?:,\d{3})*(?:\.\d+)?)\s*kcal\s*(?:ME\s*)?/\s*(?P<unit>cup|can|oz|treat|pouch|tray|piece|stick)\b")
        .expect("KCAL_PER_UNIT regex")
});

// =============================================================================
// Classification Patterns
// =============================================================================

/// "All life stages" and equivalents.
pub static ALL_LIFE_STAGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\ball\s+life\s*-?\s*stages?\b|\ball\s+ages\b|\bevery\s+life\s+stage\b")
        .expect("ALL_LIFE_STAGES regex")
});

/// Kitten phrasing precise enough for body text.
pub static KITTEN_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+kittens\b|\bkitten\s+(?:formula|food|recipe|chow|dry|wet|pate|pâté)\b|\bgrowing\s+kittens\b")
        .expect("KITTEN_PHRASE regex")
});

/// Puppy phrasing precise enough for body text.
pub static PUPPY_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+pupp(?:y|ies)\b|\bpuppy\s+(?:formula|food|recipe|chow|dry|wet)\b|\bgrowing\s+puppies\b")
        .expect("PUPPY_PHRASE regex")
});

/// Senior phrasing precise enough for body text.
pub static SENIOR_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsenior\s+(?:dogs?|cats?|formula|food|recipe)\b|\bfor\s+seniors\b|\b(?:7|11)\s*\+|\bmature\s+adult\b")
        .expect("SENIOR_PHRASE regex")
});

/// Bare life-stage words, trusted only in URL, title and headings.
pub static KITTEN_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bkittens?\b").expect("KITTEN_WORD regex"));

pub static PUPPY_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpupp(?:y|ies)\b").expect("PUPPY_WORD regex"));

pub static SENIOR_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsenior\b|\bmature\b").expect("SENIOR_WORD regex"));

pub static ADULT_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\badult\b").expect("ADULT_WORD regex"));

// =============================================================================
// CSS Selectors
// =============================================================================

/// Product heading candidates.
pub const PRODUCT_TITLE_SELECTOR: &str =
    "h1[itemprop='name'], [itemprop='name'] h1, h1.product-title, h1.product_title, h1[class*='product'], [data-testid='product-title'], h1";

/// Breadcrumb and navigation trails.
pub const BREADCRUMB_SELECTOR: &str =
    "nav[aria-label*='readcrumb'], [class*='breadcrumb'], [id*='breadcrumb'], [itemtype*='BreadcrumbList']";

/// Main content containers.
pub const MAIN_SELECTOR: &str =
    "main, [role='main'], #main, #content, .product, [class*='product-detail'], [itemtype*='Product']";

/// Elements whose class mentions a brand.
pub const BRAND_CLASS_SELECTOR: &str = "[class*='brand' i]";

/// Explicit size/weight fields.
pub const SIZE_SELECTOR: &str =
    "[itemprop='weight'], [class*='size' i] .selected, [class*='variant' i] [aria-checked='true'], [class*='size' i][aria-selected='true'], [data-size]";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_captures_pack_and_unit() {
        let caps = SIZE.captures("Tender Chunks, 12 x 3 oz cans");
        let Some(caps) = caps else { panic!("no size match") };
        assert_eq!(caps.name("count").map(|m| m.as_str()), Some("12"));
        assert_eq!(caps.name("qty").map(|m| m.as_str()), Some("3"));
        assert_eq!(caps.name("unit").map(|m| m.as_str()), Some("oz"));
    }

    #[test]
    fn ga_patterns_accept_common_layouts() {
        let text = "Crude Protein (min) 26.0%\nCrude Fat (min.) ..... 16%\nCrude Fiber 4.0% max\nMoisture (max) 10%";
        let value = |re: &Regex| re.captures(text).map(|c| c["value"].to_string());
        assert_eq!(value(&GA_PROTEIN).as_deref(), Some("26.0"));
        assert_eq!(value(&GA_FAT).as_deref(), Some("16"));
        assert_eq!(value(&GA_FIBER).as_deref(), Some("4.0"));
        assert_eq!(value(&GA_MOISTURE).as_deref(), Some("10"));
    }

    #[test]
    fn kcal_matches_grouped_numbers() {
        let caps = KCAL_PER_KG.captures("Calorie Content: 1,214 kcal/kg, 34.4 kcal/oz");
        assert_eq!(caps.map(|c| c["value"].to_string()), Some("1,214".to_string()));
        assert!(KCAL_PER_UNIT.is_match("34.4 kcal/oz"));
        assert!(KCAL_PER_KG.is_match("3,720 kcal ME/kg"));
    }

    #[test]
    fn all_caps_header_requires_uppercase_line() {
        assert!(ALL_CAPS_HEADER.is_match("Chicken, Rice\nGUARANTEED ANALYSIS\n"));
        assert!(!ALL_CAPS_HEADER.is_match("Chicken, Rice, Peas"));
    }

    #[test]
    fn raw_og_image_either_order() {
        let a = r#"<meta property="og:image" content="https://x.com/a.jpg">"#;
        let b = r#"<meta content="https://x.com/b.jpg" property="og:image">"#;
        assert_eq!(RAW_OG_IMAGE.captures(a).map(|c| c["url"].to_string()), Some("https://x.com/a.jpg".to_string()));
        assert_eq!(
            RAW_OG_IMAGE_REVERSED.captures(b).map(|c| c["url"].to_string()),
            Some("https://x.com/b.jpg".to_string())
        );
    }

    #[test]
    fn title_suffix_strips_retailer() {
        let cleaned = TITLE_RETAILER_SUFFIX.replace("Blue Buffalo Adult Chicken | Chewy", "");
        assert_eq!(cleaned, "Blue Buffalo Adult Chicken");
        let cleaned = TITLE_RETAILER_SUFFIX.replace("Friskies Pate 5.5oz : Target", "");
        assert_eq!(cleaned, "Friskies Pate 5.5oz");
    }

    #[test]
    fn ingredient_code_shape() {
        assert!(INGREDIENT_CODE.is_match("N600123"));
        assert!(!INGREDIENT_CODE.is_match("Niacin"));
    }
}
