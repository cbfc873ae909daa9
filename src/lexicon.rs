//! Versioned keyword tables.
//!
//! Every heuristic that needs vocabulary (brand names, ingredient terms,
//! texture words, rejection phrases) reads it from a [`Lexicon`]. The
//! built-in table is compiled into the binary from `data/lexicon.json`;
//! deployments can load their own with [`Lexicon::from_path`].
//!
//! All terms are stored lowercase except brand display names and
//! compound-brand values, which keep their canonical casing.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::result::Texture;

const BUILTIN_JSON: &str = include_str!("../data/lexicon.json");

#[allow(clippy::expect_used)]
static BUILTIN: LazyLock<Arc<Lexicon>> = LazyLock::new(|| {
    Arc::new(Lexicon::from_json(BUILTIN_JSON).expect("built-in lexicon is valid"))
});

/// Keyword hits per texture category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureTerms {
    #[serde(default)]
    pub treats: Vec<String>,
    #[serde(default)]
    pub toppers: Vec<String>,
    #[serde(default)]
    pub pate: Vec<String>,
    #[serde(default)]
    pub wet: Vec<String>,
    #[serde(default)]
    pub dry: Vec<String>,
    #[serde(default)]
    pub freeze_dried: Vec<String>,
    #[serde(default)]
    pub air_dried: Vec<String>,
    #[serde(default)]
    pub raw: Vec<String>,
}

impl TextureTerms {
    /// Terms for one texture category.
    #[must_use]
    pub fn terms(&self, texture: Texture) -> &[String] {
        match texture {
            Texture::Treats => &self.treats,
            Texture::Toppers => &self.toppers,
            Texture::Pate => &self.pate,
            Texture::Wet => &self.wet,
            Texture::Dry => &self.dry,
            Texture::FreezeDried => &self.freeze_dried,
            Texture::AirDried => &self.air_dried,
            Texture::Raw => &self.raw,
        }
    }
}

/// Keyword tables driving every text heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Table format version. Must be at least 1.
    pub version: u32,

    /// Known brand display names.
    pub brands: Vec<String>,

    /// Run-together spelling -> spaced display name (`bluebuffalo` -> `Blue Buffalo`).
    #[serde(default)]
    pub compound_brands: BTreeMap<String, String>,

    /// Tokens that typically open an ingredient list.
    pub primary_starters: Vec<String>,

    #[serde(default)]
    pub technical_terms: Vec<String>,
    #[serde(default)]
    pub generic_ingredients: Vec<String>,
    #[serde(default)]
    pub marketing_terms: Vec<String>,
    #[serde(default)]
    pub promotional_terms: Vec<String>,
    #[serde(default)]
    pub navigation_terms: Vec<String>,
    #[serde(default)]
    pub legal_terms: Vec<String>,
    #[serde(default)]
    pub disclaimer_terms: Vec<String>,
    #[serde(default)]
    pub nutrition_panel_terms: Vec<String>,
    #[serde(default)]
    pub page_title_terms: Vec<String>,

    /// Markers of markup or script text leaking into a candidate.
    #[serde(default)]
    pub contamination_markers: Vec<String>,

    #[serde(default)]
    pub wet_food_phrases: Vec<String>,

    /// Filler phrases stripped from the end of the last ingredient.
    #[serde(default)]
    pub trailing_phrases: Vec<String>,

    /// British spelling -> American spelling.
    #[serde(default)]
    pub british_spellings: BTreeMap<String, String>,

    #[serde(default)]
    pub textures: TextureTerms,

    /// Phrases that turn a dry+raw match into freeze-dried.
    #[serde(default)]
    pub freeze_dried_support: Vec<String>,

    #[serde(default)]
    pub cat_terms: Vec<String>,
    #[serde(default)]
    pub dog_terms: Vec<String>,

    /// Named proteins, used to cross-check a title against an ingredient list.
    #[serde(default)]
    pub proteins: Vec<String>,
}

impl Lexicon {
    /// Table compiled into the crate.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Shared handle to the built-in table. Never copies it.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Parse and validate a lexicon from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON and [`Error::Lexicon`] when
    /// the table is structurally unusable.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut lexicon: Self = serde_json::from_str(json)?;
        lexicon.validate()?;
        lexicon.lowercase_terms();
        Ok(lexicon)
    }

    /// Load a lexicon from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, otherwise the
    /// errors of [`Lexicon::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(Error::Lexicon("version must be at least 1".to_string()));
        }
        if self.brands.is_empty() {
            return Err(Error::Lexicon("brand table is empty".to_string()));
        }
        if self.primary_starters.is_empty() {
            return Err(Error::Lexicon("primary starter table is empty".to_string()));
        }
        Ok(())
    }

    fn lowercase_terms(&mut self) {
        let lists = [
            &mut self.primary_starters,
            &mut self.technical_terms,
            &mut self.generic_ingredients,
            &mut self.marketing_terms,
            &mut self.promotional_terms,
            &mut self.navigation_terms,
            &mut self.legal_terms,
            &mut self.disclaimer_terms,
            &mut self.nutrition_panel_terms,
            &mut self.page_title_terms,
            &mut self.contamination_markers,
            &mut self.wet_food_phrases,
            &mut self.trailing_phrases,
            &mut self.freeze_dried_support,
            &mut self.cat_terms,
            &mut self.dog_terms,
            &mut self.proteins,
            &mut self.textures.treats,
            &mut self.textures.toppers,
            &mut self.textures.pate,
            &mut self.textures.wet,
            &mut self.textures.dry,
            &mut self.textures.freeze_dried,
            &mut self.textures.air_dried,
            &mut self.textures.raw,
        ];
        for list in lists {
            for term in list.iter_mut() {
                *term = term.to_lowercase();
            }
        }
        self.compound_brands = std::mem::take(&mut self.compound_brands)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self.british_spellings = std::mem::take(&mut self.british_spellings)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
    }

    /// Canonical display name when `candidate` is a known brand (any casing).
    #[must_use]
    pub fn canonical_brand(&self, candidate: &str) -> Option<&str> {
        let lower = candidate.trim().to_lowercase();
        self.brands
            .iter()
            .find(|b| b.to_lowercase() == lower)
            .map(String::as_str)
    }

    /// Spaced display name for a run-together brand spelling.
    #[must_use]
    pub fn compound_brand(&self, candidate: &str) -> Option<&str> {
        let key: String = candidate
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '&')
            .flat_map(char::to_lowercase)
            .collect();
        self.compound_brands.get(&key).map(String::as_str)
    }

    /// Longest known brand occurring in `text` at word boundaries.
    #[must_use]
    pub fn find_brand(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.brands
            .iter()
            .filter(|b| contains_word(&lower, &b.to_lowercase()))
            .max_by_key(|b| b.len())
            .map(String::as_str)
    }

    /// Brand named by a URL's host or path slug.
    ///
    /// Separators become spaces before matching, then run-together
    /// domain spellings (`bluebuffalo.com`) are looked up.
    #[must_use]
    pub fn find_brand_in_url(&self, url_lower: &str) -> Option<&str> {
        let spaced: String = url_lower
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '&' || c == '\'' { c } else { ' ' })
            .collect();
        if let Some(brand) = self.find_brand(&spaced) {
            return Some(brand);
        }

        spaced
            .split_whitespace()
            .find_map(|token| self.compound_brands.get(token))
            .map(String::as_str)
    }

    /// American spelling for a lowercase British word.
    #[must_use]
    pub fn american_spelling(&self, word_lower: &str) -> Option<&str> {
        self.british_spellings.get(word_lower).map(String::as_str)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Whether `needle` occurs in `haystack` at word boundaries.
///
/// Both arguments are expected lowercase. A boundary is only required on
/// ends of the needle that are alphanumeric, so `"% off"` and `"| chewy"`
/// match inside punctuation.
#[must_use]
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    count_occurrences(haystack, needle) > 0
}

/// Number of boundary-respecting occurrences of `needle` in `haystack`.
#[must_use]
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }

    let check_start = needle.chars().next().is_some_and(char::is_alphanumeric);
    let check_end = needle.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack
        .match_indices(needle)
        .filter(|(idx, _)| {
            let before_ok = !check_start
                || haystack[..*idx]
                    .chars()
                    .next_back()
                    .is_none_or(|c| !c.is_alphanumeric());
            let after_ok = !check_end
                || haystack[idx + needle.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| !c.is_alphanumeric());
            before_ok && after_ok
        })
        .count()
}

/// Number of distinct `terms` present in `haystack`.
#[must_use]
pub fn count_hits(haystack: &str, terms: &[String]) -> usize {
    terms.iter().filter(|t| contains_word(haystack, t)).count()
}

/// Whether any of `terms` is present in `haystack`.
#[must_use]
pub fn any_hit(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| contains_word(haystack, t))
}
