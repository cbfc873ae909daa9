//! Candidate harvesting.
//!
//! Several independent boundary patterns cut ingredient-list candidates
//! out of the page text. A scan of the raw markup adds candidates from
//! embedded JSON payloads; those are marked suspicious because nothing on
//! the visible page vouches for them.

use crate::lexicon::Lexicon;
use crate::normalize::{self, truncate_chars};
use crate::patterns::{
    ALL_CAPS_HEADER, EMBEDDED_JSON_INGREDIENTS, INGREDIENTS_HEADING, INGREDIENTS_LABEL,
    INGREDIENTS_SENTENCE, INGREDIENTS_TERMINATOR, OUR_INGREDIENTS,
};

/// Minimum length of a harvested candidate.
const MIN_CANDIDATE_CHARS: usize = 10;

/// Commas an unlabeled line needs before it is taken as a list.
const MIN_DENSE_COMMAS: usize = 5;

/// Boundary pattern family, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    LabeledBlock,
    OurIngredients,
    Heading,
    Sentence,
    UnlabeledDense,
    EmbeddedJson,
}

impl Family {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LabeledBlock => "labeled_block",
            Self::OurIngredients => "our_ingredients",
            Self::Heading => "heading",
            Self::Sentence => "sentence",
            Self::UnlabeledDense => "unlabeled_dense",
            Self::EmbeddedJson => "embedded_json",
        }
    }

    /// Candidates nothing on the visible page vouches for.
    #[must_use]
    pub fn is_suspicious(self) -> bool {
        self == Self::EmbeddedJson
    }
}

/// One raw candidate span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvested {
    pub family: Family,
    pub text: String,
    /// Byte offset in the text (or markup) it was cut from.
    pub position: usize,
}

/// Harvest every candidate from page text and raw markup.
#[must_use]
pub fn harvest(text: &str, html: &str, lexicon: &Lexicon, max_span: usize) -> Vec<Harvested> {
    let mut out = Vec::new();
    let mut push = |family: Family, span: &str, position: usize| {
        let span = truncate_chars(span.trim(), max_span).trim();
        if span.chars().count() >= MIN_CANDIDATE_CHARS {
            out.push(Harvested {
                family,
                text: span.to_string(),
                position,
            });
        }
    };

    for m in INGREDIENTS_LABEL.find_iter(text) {
        push(Family::LabeledBlock, block_after(text, m.end()), m.end());
    }

    for m in OUR_INGREDIENTS.find_iter(text) {
        push(Family::OurIngredients, block_after(text, m.end()), m.end());
    }

    for m in INGREDIENTS_HEADING.find_iter(text) {
        push(Family::Heading, block_after(text, m.end()), m.end());
    }

    for caps in INGREDIENTS_SENTENCE.captures_iter(text) {
        if let Some(body) = caps.name("body") {
            push(Family::Sentence, body.as_str(), body.start());
        }
    }

    let mut offset = 0;
    for line in text.split('\n') {
        if line.matches(',').count() >= MIN_DENSE_COMMAS && starts_with_primary(line, lexicon) {
            push(Family::UnlabeledDense, line, offset);
        }
        offset += line.len() + 1;
    }

    for caps in EMBEDDED_JSON_INGREDIENTS.captures_iter(html) {
        if let Some(body) = caps.name("body") {
            let decoded = decode_embedded(body.as_str());
            push(Family::EmbeddedJson, &decoded, body.start());
        }
    }

    out
}

/// Whether `line` opens with a known first-ingredient token.
#[must_use]
pub fn starts_with_primary(line: &str, lexicon: &Lexicon) -> bool {
    let lower = normalize::for_matching(line);
    let lower = lower.trim_start();
    lexicon.primary_starters.iter().any(|starter| {
        lower.starts_with(starter.as_str())
            && lower[starter.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric())
    })
}

/// Text from `start` to the end of the ingredient block.
///
/// The block stops at a nutrition keyword, an ALL-CAPS header line, a line
/// ending in a period, or the first comma-free line once the block already
/// has commas.
fn block_after(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    let mut end = rest.len();

    if let Some(m) = INGREDIENTS_TERMINATOR.find(rest) {
        end = end.min(m.start());
    }
    if let Some(m) = ALL_CAPS_HEADER.find_iter(rest).find(|m| m.start() > 0) {
        end = end.min(m.start());
    }

    let mut seen_comma = false;
    let mut line_start = 0;
    for line in rest[..end].split_inclusive('\n') {
        let content = line.trim_end();
        if line_start > 0 && seen_comma && !content.contains(',') {
            end = line_start;
            break;
        }
        seen_comma |= content.contains(',');
        line_start += line.len();
        if content.ends_with('.') && line.ends_with('\n') {
            end = line_start;
            break;
        }
    }

    &rest[..end]
}

/// Decode a JSON string body and cut it at the first nutrition section.
#[must_use]
pub fn decode_embedded(body: &str) -> String {
    let decoded = serde_json::from_str::<String>(&format!("\"{body}\""))
        .unwrap_or_else(|_| normalize::decode_unicode_escapes(body).into_owned());
    let decoded = normalize::clean(&decoded);

    let cut = INGREDIENTS_TERMINATOR
        .find(&decoded)
        .map_or(decoded.as_str(), |m| &decoded[..m.start()]);
    let cut = INGREDIENTS_LABEL
        .find(cut)
        .filter(|m| m.start() == 0)
        .map_or(cut, |m| &cut[m.end()..]);
    cut.trim().to_string()
}
