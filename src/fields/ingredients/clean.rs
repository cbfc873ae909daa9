//! Ingredient list cleanup.
//!
//! Turns a winning span into tokens. Every step is idempotent, so cleaning
//! the comma-joined output again yields the same tokens.

use crate::lexicon::Lexicon;
use crate::normalize;
use crate::patterns::{NUTRIENT_GROUP, RUN_TOGETHER};
use crate::validators::is_invalid_ingredient_code;

/// Clean a raw span into ingredient tokens, in source order.
#[must_use]
pub fn clean_ingredients(raw: &str, lexicon: &Lexicon) -> Vec<String> {
    let text = normalize::clean(raw);
    let text = normalize::americanize(&text, lexicon);
    let text = unwrap_nutrient_groups(&text);
    let text = split_run_together(&text);

    split_top_level(&text)
        .into_iter()
        .filter_map(|token| clean_token(token, lexicon))
        .collect()
}

/// `Chicken BrothTuna` → `Chicken Broth, Tuna`. `MacArthur` stays whole.
fn split_run_together(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;

    for caps in RUN_TOGETHER.captures_iter(text) {
        let (Some(left), Some(right)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let word_start = text[..left.end()]
            .rfind(|c: char| !c.is_alphanumeric())
            .map_or(0, |i| i + 1);
        if &text[word_start..left.end()] == "Mac" {
            continue;
        }
        out.push_str(&text[last..left.end()]);
        out.push_str(", ");
        last = right.start();
    }
    out.push_str(&text[last..]);
    out
}

/// `Vitamins (A, B, C)` → `A, B, C`. Groups with no balanced closer are kept.
#[must_use]
pub fn unwrap_nutrient_groups(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(m) = NUTRIENT_GROUP.find(rest) {
        let opener = rest[..m.end()].chars().next_back();
        let closer = match opener {
            Some('(') => ')',
            Some('[') => ']',
            _ => {
                // `Vitamins:` label: drop the label, keep the list.
                out.push_str(&rest[..m.start()]);
                rest = &rest[m.end()..];
                continue;
            }
        };

        let Some(inner_len) = balanced_len(&rest[m.end()..], opener.unwrap_or('('), closer) else {
            out.push_str(&rest[..m.end()]);
            rest = &rest[m.end()..];
            continue;
        };

        out.push_str(&rest[..m.start()]);
        out.push_str(rest[m.end()..m.end() + inner_len].trim());
        rest = &rest[m.end() + inner_len + closer.len_utf8()..];
    }
    out.push_str(rest);
    out
}

/// Length of the text before the closer matching an already-consumed opener.
fn balanced_len(text: &str, opener: char, closer: char) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, c) in text.char_indices() {
        if c == opener {
            depth += 1;
        } else if c == closer {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Split on commas outside parentheses and brackets.
#[must_use]
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = (depth - 1).max(0),
            ',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

const EDGE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '*', '-', '–', '—'];

fn clean_token(token: &str, lexicon: &Lexicon) -> Option<String> {
    let mut current = normalize::collapse_whitespace(token);

    loop {
        let trimmed = current
            .trim()
            .trim_start_matches(|c: char| EDGE_PUNCTUATION.contains(&c) || c.is_whitespace())
            .trim_end_matches(|c: char| EDGE_PUNCTUATION.contains(&c) || c.is_whitespace());
        let stripped = strip_trailing_phrase(trimmed, lexicon);
        if stripped == current {
            break;
        }
        current = stripped;
    }

    if current.is_empty() || is_invalid_ingredient_code(&current) {
        return None;
    }
    Some(current)
}

fn strip_trailing_phrase(token: &str, lexicon: &Lexicon) -> String {
    let lower = token.to_lowercase();
    for phrase in &lexicon.trailing_phrases {
        // Edge punctuation is already gone from the token.
        let phrase = phrase.trim_end_matches(EDGE_PUNCTUATION);
        if phrase.is_empty() {
            continue;
        }
        if lower == phrase {
            return String::new();
        }
        if lower.ends_with(phrase) {
            let cut = token.len().saturating_sub(phrase.len());
            let head = token.get(..cut).unwrap_or(token);
            let boundary = head.chars().next_back().is_none_or(|c| !c.is_alphanumeric());
            if boundary {
                return head.trim_end().to_string();
            }
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex() -> &'static Lexicon {
        Lexicon::builtin()
    }

    #[test]
    fn splits_outside_parentheses() {
        let tokens = clean_ingredients(
            "Chicken, Chicken Fat (preserved with Mixed Tocopherols, Citric Acid), Rice.",
            lex(),
        );
        assert_eq!(
            tokens,
            ["Chicken", "Chicken Fat (preserved with Mixed Tocopherols, Citric Acid)", "Rice"]
        );
    }

    #[test]
    fn unwraps_vitamin_groups() {
        let tokens = clean_ingredients(
            "Salmon, Vitamins (Vitamin E Supplement, Niacin (B3), Biotin), Minerals [Zinc Sulfate]",
            lex(),
        );
        assert_eq!(
            tokens,
            ["Salmon", "Vitamin E Supplement", "Niacin (B3)", "Biotin", "Zinc Sulfate"]
        );
    }

    #[test]
    fn inserts_missing_commas_and_drops_codes() {
        let tokens = clean_ingredients("Chicken BrothTuna, N600123, Guar Gum", lex());
        assert_eq!(tokens, ["Chicken Broth", "Tuna", "Guar Gum"]);

        let tokens = clean_ingredients("Chicken, McDonald Farms Beef, pH Control Agent, MacArthur Oats", lex());
        assert_eq!(tokens, ["Chicken", "McDonald Farms Beef", "pH Control Agent", "MacArthur Oats"]);

        let tokens = clean_ingredients("Salmon (Preserved with Tocopherols)Rice, DHA Gold", lex());
        assert_eq!(tokens, ["Salmon (Preserved with Tocopherols)", "Rice", "DHA Gold"]);
    }

    #[test]
    fn americanizes_and_strips_trailing_phrases() {
        let tokens = clean_ingredients("Beef, Natural Flavour, Zinc Sulphate and other minerals, etc.", lex());
        assert_eq!(tokens, ["Beef", "Natural Flavor", "Zinc Sulfate"]);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let inputs = [
            "Chicken, Chicken Meal, Rice, Vitamin E Supplement.",
            "Turkey BrothLiver, Vitamins (A, D3), Colour, and more and more",
            "Water Sufficient For Processing; Tuna, N600123.",
        ];
        for input in inputs {
            let once = clean_ingredients(input, lex());
            let twice = clean_ingredients(&once.join(", "), lex());
            assert_eq!(once, twice, "input: {input}");
        }
    }
}
