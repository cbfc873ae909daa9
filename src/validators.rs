//! Candidate validators.
//!
//! Per-field predicates that reject implausible candidates: navigation
//! chrome, marketing copy, nutrition disclaimers and regulatory codes.

use crate::lexicon::{any_hit, count_hits, Lexicon};
use crate::patterns::INGREDIENT_CODE;

/// Placeholder values that mean "nothing here".
const SENTINEL_MARKERS: &[&str] = &["not found", "not available", "n/a"];

const EMPTY_WORDS: &[&str] = &["none", "null", "undefined", "nan", "-"];

/// Words that, on their own, are site chrome rather than a brand.
const BRAND_STOPWORDS: &[&str] = &[
    "brand", "brands", "all brands", "shop", "home", "menu", "products", "search", "sale",
    "new", "deals", "pet", "pets", "dog", "cat", "food",
];

/// Whether a value is a failure placeholder rather than a real value.
#[must_use]
pub fn is_sentinel(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    EMPTY_WORDS.contains(&lower.as_str()) || SENTINEL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether text reads like site navigation.
#[must_use]
pub fn looks_like_navigation(text_lower: &str, lexicon: &Lexicon) -> bool {
    any_hit(text_lower, &lexicon.navigation_terms)
}

/// Whether text reads like marketing copy (two or more marketing/promo hits).
#[must_use]
pub fn looks_like_marketing(text_lower: &str, lexicon: &Lexicon) -> bool {
    count_hits(text_lower, &lexicon.marketing_terms) + count_hits(text_lower, &lexicon.promotional_terms)
        >= 2
}

/// Whether text reads like a legal or supplement disclaimer.
#[must_use]
pub fn looks_like_nutrition_disclaimer(text_lower: &str, lexicon: &Lexicon) -> bool {
    any_hit(text_lower, &lexicon.disclaimer_terms) || any_hit(text_lower, &lexicon.legal_terms)
}

/// Whether an ingredient token is a regulatory/product code (`N600123`).
#[must_use]
pub fn is_invalid_ingredient_code(token: &str) -> bool {
    INGREDIENT_CODE.is_match(token.trim())
}

/// Brand candidates: short, not chrome, not a URL, not just digits.
#[must_use]
pub fn is_plausible_brand(value: &str, lexicon: &Lexicon) -> bool {
    let value = value.trim();
    let chars = value.chars().count();
    if !(2..=60).contains(&chars) || value.split_whitespace().count() > 6 {
        return false;
    }
    if is_sentinel(value) || value.contains("http") || value.contains('{') || value.ends_with(':') {
        return false;
    }
    if !value.chars().any(char::is_alphabetic) {
        return false;
    }

    let lower = value.to_lowercase();
    !BRAND_STOPWORDS.contains(&lower.as_str())
        && !looks_like_navigation(&lower, lexicon)
        && !looks_like_marketing(&lower, lexicon)
}

/// Product-name candidates: not a placeholder, not a marketing tagline.
#[must_use]
pub fn is_plausible_name(value: &str, lexicon: &Lexicon) -> bool {
    let value = value.trim();
    let chars = value.chars().count();
    (3..=250).contains(&chars)
        && !is_sentinel(value)
        && value.chars().filter(|c| c.is_alphabetic()).count() >= 3
        && !looks_like_marketing(&value.to_lowercase(), lexicon)
}

/// Image candidates: something that can resolve to an http(s) URL.
#[must_use]
pub fn is_plausible_image_ref(value: &str) -> bool {
    let value = value.trim();
    value.len() >= 5
        && !value.starts_with("data:")
        && !value.starts_with("javascript:")
        && !value.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        assert!(is_sentinel("Brand not found"));
        assert!(is_sentinel("Ingredients not available"));
        assert!(is_sentinel(" null "));
        assert!(!is_sentinel("Blue Buffalo"));
    }

    #[test]
    fn brand_plausibility() {
        let lex = Lexicon::builtin();
        assert!(is_plausible_brand("Blue Buffalo", lex));
        assert!(is_plausible_brand("Stella & Chewy's", lex));
        assert!(!is_plausible_brand("Brands", lex));
        assert!(!is_plausible_brand("12345", lex));
        assert!(!is_plausible_brand("Shop all dog food and cat food now and today", lex));
        assert!(!is_plausible_brand("https://x.com", lex));
        assert!(!is_plausible_brand("Tasty Treats, Free Shipping", lex));
    }

    #[test]
    fn name_plausibility() {
        let lex = Lexicon::builtin();
        assert!(is_plausible_name("Indoor Adult Chicken Recipe", lex));
        assert!(!is_plausible_name("Irresistible Taste Your Cat Will Love", lex));
        assert!(!is_plausible_name("Shop Now - Free Shipping", lex));
        assert!(!is_plausible_name("n/a", lex));
    }

    #[test]
    fn codes_and_disclaimers() {
        let lex = Lexicon::builtin();
        assert!(is_invalid_ingredient_code("N600123"));
        assert!(!is_invalid_ingredient_code("Vitamin B12"));
        assert!(looks_like_nutrition_disclaimer(
            "please note that these statements have not been evaluated",
            lex
        ));
        assert!(looks_like_marketing("delicious flavor your cat will love. free shipping", lex));
        assert!(!looks_like_marketing("chicken, rice, peas", lex));
    }

    #[test]
    fn image_refs() {
        assert!(is_plausible_image_ref("//cdn.x.com/a.jpg"));
        assert!(!is_plausible_image_ref("data:image/gif;base64,R0lG"));
        assert!(!is_plausible_image_ref("a b.jpg"));
    }
}
