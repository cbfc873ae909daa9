//! Plausibility check for ingredient candidates.

use crate::lexicon::{any_hit, count_hits, Lexicon};
use crate::normalize::for_matching;
use crate::validators::{looks_like_navigation, looks_like_nutrition_disclaimer};

use super::harvest::starts_with_primary;

/// Whether `text` reads like an ingredient list rather than page chrome,
/// legal copy or a nutrition panel.
#[must_use]
pub fn is_likely_ingredient_list(text: &str, lexicon: &Lexicon) -> bool {
    let lower = for_matching(text);

    if looks_like_navigation(&lower, lexicon)
        || looks_like_nutrition_disclaimer(&lower, lexicon)
        || any_hit(&lower, &lexicon.nutrition_panel_terms)
        || any_hit(&lower, &lexicon.page_title_terms)
    {
        return false;
    }

    let has_commas = lower.contains(',');
    let starts_right = starts_with_primary(&lower, lexicon);
    let generic = count_hits(&lower, &lexicon.generic_ingredients);
    let technical = count_hits(&lower, &lexicon.technical_terms);
    let words = lower.split_whitespace().count();

    (starts_right && has_commas)
        || any_hit(&lower, &lexicon.wet_food_phrases)
        || (generic >= 5 && words >= 20 && has_commas)
        || technical >= 3
        || (starts_right && generic >= 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> bool {
        is_likely_ingredient_list(text, Lexicon::builtin())
    }

    #[test]
    fn accepts_real_lists() {
        assert!(check("Chicken, Chicken Meal, Rice, Vitamin E Supplement."));
        assert!(check("Tuna, Water Sufficient For Processing, Guar Gum"));
        assert!(check("Taurine, Zinc Sulfate, Biotin, Folic Acid"));
    }

    #[test]
    fn rejects_chrome_and_panels() {
        assert!(!check("Chicken, Sign In, My Account, Track Order"));
        assert!(!check("Crude Protein (min) 26%, Crude Fat (min) 15%"));
        assert!(!check("Chicken recipe, consult your veterinarian before feeding"));
        assert!(!check("Blue Buffalo Chicken Recipe | Chewy"));
    }

    #[test]
    fn rejects_prose_without_evidence() {
        assert!(!check("Our recipes are made with care in the USA"));
    }
}
