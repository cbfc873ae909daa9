//! Text normalization shared by every extractor.
//!
//! Raw candidate text arrives with entities, stray tags, non-breaking
//! spaces and British spellings. These helpers turn it into the forms the
//! matchers and the output expect.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::lexicon::Lexicon;

#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_RE regex"));

#[allow(clippy::expect_used)]
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("WORD_RE regex"));

#[allow(clippy::expect_used)]
static UNICODE_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("UNICODE_ESCAPE_RE regex"));

/// Decode HTML entities (`&amp;`, `&#233;`, `&eacute;`).
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}

/// Replace markup tags with spaces.
#[must_use]
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, " ")
}

/// Collapse every whitespace run (including NBSP) to one space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entity-decoded, tag-free, whitespace-collapsed text in original case.
#[must_use]
pub fn clean(text: &str) -> String {
    let decoded = decode_entities(text);
    let stripped = strip_tags(&decoded);
    collapse_whitespace(&stripped)
}

/// Lowercased matching form: [`clean`] plus folded quotes and dashes.
#[must_use]
pub fn for_matching(text: &str) -> String {
    clean(text)
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Decode `\uXXXX` escapes left in text lifted out of JSON blobs.
#[must_use]
pub fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    UNICODE_ESCAPE_RE.replace_all(text, |caps: &Captures<'_>| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    })
}

/// Rewrite British spellings to American, keeping the word's capitalization.
#[must_use]
pub fn americanize<'a>(text: &'a str, lexicon: &Lexicon) -> Cow<'a, str> {
    if lexicon.british_spellings.is_empty() {
        return Cow::Borrowed(text);
    }

    WORD_RE.replace_all(text, |caps: &Captures<'_>| {
        let word = &caps[0];
        match lexicon.american_spelling(&word.to_lowercase()) {
            Some(american) => match_case(word, american),
            None => word.to_string(),
        }
    })
}

fn match_case(original: &str, replacement: &str) -> String {
    let letters = original.chars().filter(|c| c.is_alphabetic());
    if original.len() > 1 && letters.clone().all(char::is_uppercase) {
        return replacement.to_uppercase();
    }
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

/// Truncate to at most `max` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_decodes_and_strips() {
        assert_eq!(
            clean("Chicken&nbsp;Meal, <b>Brown</b>\n Rice &amp; Oats"),
            "Chicken Meal, Brown Rice & Oats"
        );
    }

    #[test]
    fn matching_form_folds_punctuation() {
        assert_eq!(for_matching("Hill\u{2019}s  Science\u{2013}Diet"), "hill's science-diet");
    }

    #[test]
    fn americanize_keeps_case() {
        let lex = Lexicon::builtin();
        assert_eq!(americanize("Crude Fibre, FLAVOUR, natural flavours", lex), "Crude Fiber, FLAVOR, natural flavors");
        assert_eq!(americanize("Zinc Sulphate", lex), "Zinc Sulfate");
    }

    #[test]
    fn americanize_is_idempotent() {
        let lex = Lexicon::builtin();
        let once = americanize("Savoury Colour", lex).into_owned();
        assert_eq!(americanize(&once, lex), once);
    }

    #[test]
    fn unicode_escapes_decode() {
        assert_eq!(decode_unicode_escapes(r"Chicken, Rice \u0026 Peas"), "Chicken, Rice & Peas");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("pâté", 2), "pâ");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
