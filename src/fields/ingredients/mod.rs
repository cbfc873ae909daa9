//! Ingredient extraction.
//!
//! Five stages: [`harvest`] candidate spans, [`score`] them on lexical
//! evidence, [`validate`] the plausible ones, [`clean`] the winner into
//! tokens, and finally escalate to a rendered document when the static
//! page produced nothing or only a suspicious list.

pub mod clean;
pub mod harvest;
pub mod score;
pub mod validate;

use crate::chain::ExtractionContext;
use crate::document::FetchedDocument;
use crate::lexicon::{contains_word, Lexicon};
use crate::normalize::for_matching;
use crate::options::Options;
use crate::result::{INGREDIENTS_NOT_AVAILABLE, NONE_SUCCESSFUL};

use self::clean::clean_ingredients;
use self::harvest::{harvest, Family};
use self::score::{pick_best, score, Scored};
use self::validate::is_likely_ingredient_list;

/// Leading tokens checked against proteins named in the title or URL.
const LEADING_TOKENS: usize = 5;

/// Characters of a JSON-sourced list that must appear on the page to confirm it.
const CONFIRMATION_CHARS: usize = 40;

/// A cleaned winner from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub family: Family,
    pub score: i32,
    pub tokens: Vec<String>,
    /// Embedded-JSON origin without on-page confirmation, or a protein
    /// mismatch with the title/URL.
    pub suspicious: bool,
}

impl Selection {
    fn strategy_name(&self, rendered: bool) -> String {
        match (rendered, self.family) {
            (false, Family::EmbeddedJson) => "embedded_json".to_string(),
            (false, family) => format!("scored_text:{}", family.as_str()),
            (true, family) => format!("rendered_dom:{}", family.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientOutcome {
    pub ingredients: Option<Vec<String>>,
    pub note: Option<String>,
    pub strategy: String,
}

impl IngredientOutcome {
    fn found(selection: Selection, strategy: String) -> Self {
        Self {
            ingredients: Some(selection.tokens),
            note: None,
            strategy,
        }
    }

    fn unavailable() -> Self {
        Self {
            ingredients: None,
            note: Some(INGREDIENTS_NOT_AVAILABLE.to_string()),
            strategy: NONE_SUCCESSFUL.to_string(),
        }
    }
}

/// Run all stages, escalating when the static result is missing or suspicious.
#[must_use]
pub fn extract(ctx: &ExtractionContext<'_>) -> IngredientOutcome {
    let proteins = named_proteins(ctx);
    let static_pick = match select(ctx.doc, ctx.lexicon, ctx.options, &proteins) {
        Some(pick) if !pick.suspicious => {
            tracing::debug!(family = pick.family.as_str(), score = pick.score, "ingredients from static page");
            let strategy = pick.strategy_name(false);
            return IngredientOutcome::found(pick, strategy);
        }
        other => other,
    };

    let rendered_pick = ctx
        .rendered_document()
        .and_then(|doc| select(doc, ctx.lexicon, ctx.options, &proteins));

    match (static_pick, rendered_pick) {
        (_, Some(rendered)) if !rendered.suspicious => {
            let strategy = rendered.strategy_name(true);
            IngredientOutcome::found(rendered, strategy)
        }
        (Some(held), _) | (None, Some(held)) => {
            tracing::debug!(family = held.family.as_str(), "keeping suspicious ingredient list");
            IngredientOutcome::found(held, "suspicious_fallback".to_string())
        }
        (None, None) => IngredientOutcome::unavailable(),
    }
}

/// Best cleaned ingredient list in one document, if any candidate validates.
#[must_use]
pub fn select(
    doc: &FetchedDocument,
    lexicon: &Lexicon,
    options: &Options,
    proteins: &[String],
) -> Option<Selection> {
    let text = doc.text();
    let candidates = harvest(text, doc.html(), lexicon, options.max_ingredient_span);

    let scored: Vec<Scored> = candidates
        .into_iter()
        .filter(|c| is_likely_ingredient_list(&c.text, lexicon))
        .filter_map(|c| {
            score(&c.text, lexicon, options.ingredient_prefix_window).map(|s| Scored { candidate: c, score: s })
        })
        .collect();

    let best = pick_best(scored)?;
    let tokens = clean_ingredients(&best.candidate.text, lexicon);
    if tokens.is_empty() {
        return None;
    }

    let unconfirmed_json = best.candidate.family.is_suspicious() && !confirmed_on_page(&tokens, text);
    let suspicious = unconfirmed_json || protein_mismatch(&tokens, proteins);

    Some(Selection {
        family: best.candidate.family,
        score: best.score,
        tokens,
        suspicious,
    })
}

/// Proteins named in the title or URL.
fn named_proteins(ctx: &ExtractionContext<'_>) -> Vec<String> {
    let url: String = ctx
        .source
        .path_lower()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let title = ctx.doc.title().unwrap_or_default();
    let haystack = for_matching(&format!("{title} {url}"));

    ctx.lexicon
        .proteins
        .iter()
        .filter(|p| contains_word(&haystack, p))
        .cloned()
        .collect()
}

/// A protein named in the title/URL that none of the leading tokens mention.
fn protein_mismatch(tokens: &[String], proteins: &[String]) -> bool {
    if proteins.is_empty() {
        return false;
    }
    let leading = for_matching(&tokens.iter().take(LEADING_TOKENS).cloned().collect::<Vec<_>>().join(", "));
    !proteins.iter().any(|p| contains_word(&leading, p))
}

/// Whether the start of a JSON-sourced list is visible on the page.
fn confirmed_on_page(tokens: &[String], page_text: &str) -> bool {
    let joined = for_matching(&tokens.join(", "));
    let probe: String = joined.chars().take(CONFIRMATION_CHARS).collect();
    !probe.is_empty() && for_matching(page_text).contains(&probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protein_mismatch_needs_a_named_protein() {
        let tokens: Vec<String> = ["Water", "Beef", "Liver"].iter().map(|s| (*s).to_string()).collect();
        assert!(!protein_mismatch(&tokens, &[]));
        assert!(!protein_mismatch(&tokens, &["beef".to_string()]));
        assert!(protein_mismatch(&tokens, &["salmon".to_string()]));
    }

    #[test]
    fn static_page_selection() {
        let doc = FetchedDocument::parse(
            "<html><body><h1>Salmon Pate</h1>\
             <p>Ingredients: Salmon, Water Sufficient For Processing, Guar Gum, Taurine.</p>\
             <p>Guaranteed Analysis: Crude Protein 10%</p></body></html>",
        );
        let pick = select(&doc, Lexicon::builtin(), &Options::default(), &["salmon".to_string()]);
        let Some(pick) = pick else {
            panic!("expected a selection");
        };
        assert_eq!(pick.family, Family::LabeledBlock);
        assert_eq!(pick.tokens, ["Salmon", "Water Sufficient For Processing", "Guar Gum", "Taurine"]);
        assert!(!pick.suspicious);
    }

    #[test]
    fn unconfirmed_embedded_json_is_suspicious() {
        let doc = FetchedDocument::parse(
            r#"<html><body><p>Great food</p>
            <script>window.__DATA__ = {"ingredients": "Chicken, Chicken Broth, Liver, Guar Gum, Taurine"}</script>
            </body></html>"#,
        );
        let pick = select(&doc, Lexicon::builtin(), &Options::default(), &[]);
        assert!(pick.is_some_and(|p| p.family == Family::EmbeddedJson && p.suspicious));
    }
}
