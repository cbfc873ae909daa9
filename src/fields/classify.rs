//! Pet type, texture and life-stage classification.
//!
//! All three classifiers read the same [`Corpus`]: an ordered list of text
//! sources running from narrow (URL, title, headings) to broad (main
//! content, body). Broader sources are only consulted when the narrower
//! ones are silent, so a stray "dog" in a footer cannot outvote the title.

use crate::chain::ExtractionContext;
use crate::dom;
use crate::lexicon::{any_hit, count_hits, count_occurrences, Lexicon};
use crate::normalize::{for_matching, truncate_chars};
use crate::options::Options;
use crate::patterns::{
    ADULT_WORD, ALL_LIFE_STAGES, BREADCRUMB_SELECTOR, KITTEN_PHRASE, KITTEN_WORD, MAIN_SELECTOR,
    PUPPY_PHRASE, PUPPY_WORD, SENIOR_PHRASE, SENIOR_WORD,
};
use crate::result::{LifeStage, PetType, Texture};

/// One corpus entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSource {
    pub label: &'static str,
    /// Lowercased, punctuation-folded text.
    pub text: String,
    /// URL, titles, headings and breadcrumbs: short enough that a bare
    /// "kitten" or "senior" is trusted.
    pub narrow: bool,
}

/// Text sources in consultation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    sources: Vec<CorpusSource>,
}

impl Corpus {
    /// Build the corpus for a parsed page.
    #[must_use]
    pub fn from_context(ctx: &ExtractionContext<'_>) -> Self {
        let mut corpus = Self::from_url(&ctx.source.lower());
        let meta = ctx.meta();
        let doc = ctx.doc;

        corpus.push("title", doc.title(), true);
        corpus.push("meta_description", meta.first(&["description"]).map(str::to_string), false);
        corpus.push("og_title", meta.first(&["og:title"]).map(str::to_string), true);
        corpus.push("og_description", meta.first(&["og:description"]).map(str::to_string), false);

        let headings: Vec<String> = doc
            .select("h1, h2")
            .nodes()
            .iter()
            .map(|n| dom::clean_text(&dom::Selection::from(*n)))
            .filter(|t| !t.is_empty())
            .collect();
        corpus.push("headings", Some(headings.join(" \n ")), true);

        let breadcrumbs = doc.select(BREADCRUMB_SELECTOR);
        corpus.push("breadcrumbs", Some(dom::clean_text(&breadcrumbs)), true);

        corpus.push_options(ctx.options, doc);
        corpus
    }

    /// A corpus holding only the URL, for direct image links.
    #[must_use]
    pub fn from_url(url_lower: &str) -> Self {
        let spaced: String = url_lower
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        let mut corpus = Self::default();
        corpus.push("url", Some(spaced), true);
        corpus
    }

    /// A corpus from explicit `(label, text, narrow)` entries.
    #[must_use]
    pub fn from_sources(sources: &[(&'static str, &str, bool)]) -> Self {
        let mut corpus = Self::default();
        for (label, text, narrow) in sources {
            corpus.push(*label, Some((*text).to_string()), *narrow);
        }
        corpus
    }

    fn push_options(&mut self, options: &Options, doc: &crate::document::FetchedDocument) {
        let main = doc.select(MAIN_SELECTOR);
        if !main.is_empty() {
            let text = dom::block_text(&main.first());
            let text = truncate_chars(&text, options.corpus_content_chars).to_string();
            self.push("main_content", Some(text), false);
        }
        let body = truncate_chars(doc.text(), options.corpus_body_chars).to_string();
        self.push("body", Some(body), false);
    }

    fn push(&mut self, label: &'static str, text: Option<String>, narrow: bool) {
        let Some(text) = text else {
            return;
        };
        let text = for_matching(&text);
        if text.trim().is_empty() {
            return;
        }
        self.sources.push(CorpusSource { label, text, narrow });
    }

    pub fn sources(&self) -> &[CorpusSource] {
        &self.sources
    }
}

/// All three classifications with the corpus source that decided each.
/// A `None` source means the default was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub pet_type: PetType,
    pub pet_type_source: Option<&'static str>,
    pub textures: Vec<Texture>,
    pub texture_source: Option<&'static str>,
    pub life_stage: LifeStage,
    pub life_stage_source: Option<&'static str>,
}

#[must_use]
pub fn classify(corpus: &Corpus, lexicon: &Lexicon, min_hits: usize) -> Classification {
    let pet = decide_pet_type(corpus, lexicon);
    let texture = decide_textures(corpus, lexicon, min_hits);
    let stage = decide_life_stage(corpus);

    Classification {
        pet_type: pet.map_or(PetType::Unknown, |(p, _)| p),
        pet_type_source: pet.map(|(_, label)| label),
        texture_source: texture.as_ref().map(|(_, label)| *label),
        textures: texture.map_or_else(|| vec![Texture::Dry], |(t, _)| t),
        life_stage: stage.map_or(LifeStage::Adult, |(s, _)| s),
        life_stage_source: stage.map(|(_, label)| label),
    }
}

/// Cat vs dog term counts; the first source with a strict majority decides.
#[must_use]
pub fn pet_type(corpus: &Corpus, lexicon: &Lexicon) -> PetType {
    decide_pet_type(corpus, lexicon).map_or(PetType::Unknown, |(p, _)| p)
}

fn decide_pet_type(corpus: &Corpus, lexicon: &Lexicon) -> Option<(PetType, &'static str)> {
    corpus.sources().iter().find_map(|source| {
        let cats = term_count(&source.text, &lexicon.cat_terms);
        let dogs = term_count(&source.text, &lexicon.dog_terms);
        match cats.cmp(&dogs) {
            std::cmp::Ordering::Greater => Some((PetType::Cat, source.label)),
            std::cmp::Ordering::Less => Some((PetType::Dog, source.label)),
            std::cmp::Ordering::Equal => None,
        }
    })
}

fn term_count(text: &str, terms: &[String]) -> usize {
    terms.iter().map(|t| count_occurrences(text, t)).sum()
}

/// Textures found in the first source with any hit, in priority order.
/// Defaults to `[Dry]`.
#[must_use]
pub fn textures(corpus: &Corpus, lexicon: &Lexicon, min_hits: usize) -> Vec<Texture> {
    decide_textures(corpus, lexicon, min_hits).map_or_else(|| vec![Texture::Dry], |(t, _)| t)
}

fn decide_textures(corpus: &Corpus, lexicon: &Lexicon, min_hits: usize) -> Option<(Vec<Texture>, &'static str)> {
    let min_hits = min_hits.max(1);

    corpus.sources().iter().find_map(|source| {
        let found: Vec<Texture> = Texture::PRIORITY
            .into_iter()
            .filter(|t| count_hits(&source.text, lexicon.textures.terms(*t)) >= min_hits)
            .collect();
        (!found.is_empty()).then(|| (apply_texture_rules(found, &source.text, lexicon), source.label))
    })
}

/// Pate implies wet. Dry plus raw, with freeze-dried support wording and
/// no explicit freeze-dried, means a freeze-dried raw inclusion.
#[must_use]
pub fn apply_texture_rules(mut found: Vec<Texture>, text: &str, lexicon: &Lexicon) -> Vec<Texture> {
    if found.contains(&Texture::Pate) && !found.contains(&Texture::Wet) {
        found.push(Texture::Wet);
    }

    let raw_inclusion = found.contains(&Texture::Dry)
        && found.contains(&Texture::Raw)
        && !found.contains(&Texture::FreezeDried)
        && any_hit(text, &lexicon.freeze_dried_support);
    if raw_inclusion {
        found.retain(|t| *t != Texture::Raw);
        found.push(Texture::FreezeDried);
    }

    found.sort();
    found.dedup();
    found
}

/// Comma-joined texture names.
#[must_use]
pub fn join_textures(textures: &[Texture]) -> String {
    textures.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(",")
}

/// "All life stages" anywhere wins, then the first source naming a stage.
#[must_use]
pub fn life_stage(corpus: &Corpus) -> LifeStage {
    decide_life_stage(corpus).map_or(LifeStage::Adult, |(s, _)| s)
}

fn decide_life_stage(corpus: &Corpus) -> Option<(LifeStage, &'static str)> {
    if let Some(source) = corpus.sources().iter().find(|s| ALL_LIFE_STAGES.is_match(&s.text)) {
        return Some((LifeStage::All, source.label));
    }
    corpus
        .sources()
        .iter()
        .find_map(|source| stage_in(source).map(|stage| (stage, source.label)))
}

fn stage_in(source: &CorpusSource) -> Option<LifeStage> {
    let text = source.text.as_str();
    if KITTEN_PHRASE.is_match(text) {
        return Some(LifeStage::Kitten);
    }
    if PUPPY_PHRASE.is_match(text) {
        return Some(LifeStage::Puppy);
    }
    if SENIOR_PHRASE.is_match(text) {
        return Some(LifeStage::Senior);
    }

    if source.narrow {
        if KITTEN_WORD.is_match(text) {
            return Some(LifeStage::Kitten);
        }
        if PUPPY_WORD.is_match(text) {
            return Some(LifeStage::Puppy);
        }
        if SENIOR_WORD.is_match(text) {
            return Some(LifeStage::Senior);
        }
        if ADULT_WORD.is_match(text) {
            return Some(LifeStage::Adult);
        }
    }
    None
}

/// A resolved name mentioning "senior" beats every other signal.
#[must_use]
pub fn apply_senior_override(stage: LifeStage, name: Option<&str>) -> LifeStage {
    match name {
        Some(name) if name.to_lowercase().contains("senior") => LifeStage::Senior,
        _ => stage,
    }
}
