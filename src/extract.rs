//! Extraction pipeline.
//!
//! Runs every field over one document and assembles the record. Fields
//! are independent: an exhausted chain leaves its sentinel and the rest
//! carry on. The only shared state between fields is the context, which
//! builds the meta/JSON-LD views and the rendered document at most once.

use std::sync::Arc;

use crate::chain::ExtractionContext;
use crate::document::FetchedDocument;
use crate::escalation::Escalator;
use crate::fields::classify::{self, Corpus};
use crate::fields::{brand, image, ingredients, name, nutrition};
use crate::lexicon::Lexicon;
use crate::options::Options;
use crate::result::{ExtractionTrace, Field, PartialRecord, ProductRecord};
use crate::sites::SiteRegistry;
use crate::url_utils::{is_direct_image_url, SourceUrl};

/// Trace label for a classifier that fell back to its default.
const DEFAULT_LABEL: &str = "default";

/// Reusable extraction engine.
///
/// Holds the options, the lexicon, the site registry and an optional
/// escalator. Cheap to clone; the lexicon is shared.
///
/// # Example
///
/// ```rust
/// use petfood_extract::{Extractor, FetchedDocument, Options};
///
/// let extractor = Extractor::new().with_options(Options {
///     combine_name_and_size: false,
///     ..Options::default()
/// });
/// let doc = FetchedDocument::parse("<html><head><title>Acana Puppy Recipe</title></head></html>");
/// let record = extractor.extract(&doc, "https://example.com/acana-puppy");
/// assert_eq!(record.brand, "Acana");
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    options: Options,
    lexicon: Arc<Lexicon>,
    sites: SiteRegistry,
    escalator: Option<Escalator>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Default options, the built-in lexicon and site registry, no escalator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            lexicon: Lexicon::shared(),
            sites: SiteRegistry::default(),
            escalator: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_lexicon(mut self, lexicon: impl Into<Arc<Lexicon>>) -> Self {
        self.lexicon = lexicon.into();
        self
    }

    #[must_use]
    pub fn with_sites(mut self, sites: SiteRegistry) -> Self {
        self.sites = sites;
        self
    }

    /// Enable live rendering for domains the registry marks as needing it.
    #[must_use]
    pub fn with_escalator(mut self, escalator: Escalator) -> Self {
        self.escalator = Some(escalator);
        self
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    #[must_use]
    pub fn sites(&self) -> &SiteRegistry {
        &self.sites
    }

    /// Extract a full record. Never fails: missing fields carry sentinels.
    ///
    /// A direct image link (see [`is_direct_image_url`]) has no page to
    /// read, so it takes the reduced URL-only path and `doc` is ignored.
    #[must_use]
    pub fn extract(&self, doc: &FetchedDocument, source_url: &str) -> ProductRecord {
        if is_direct_image_url(source_url) {
            tracing::debug!(url = source_url, "direct image link, URL-only extraction");
            return ProductRecord::from(self.extract_from_url_only(source_url));
        }

        let source = SourceUrl::new(source_url);
        let ctx = ExtractionContext::new(doc, &source, &self.lexicon, &self.options, &self.sites)
            .with_escalator(self.escalator.as_ref());
        let mut trace = ExtractionTrace::default();

        let brand = brand::extract(&ctx);
        trace.record(Field::Brand, brand.strategy);

        let image = image::extract(&ctx);
        trace.record(Field::Image, image.strategy);

        let naming = name::extract(&ctx);
        trace.record(Field::Name, naming.name_strategy);
        trace.record(Field::Size, naming.size_strategy);
        let display_name = naming.display_name(self.options.combine_name_and_size);

        let corpus = Corpus::from_context(&ctx);
        let classes = classify::classify(&corpus, &self.lexicon, self.options.texture_min_hits);
        let life_stage = classify::apply_senior_override(classes.life_stage, naming.name.as_deref());
        trace.record(Field::PetType, classes.pet_type_source.unwrap_or(DEFAULT_LABEL));
        trace.record(Field::Texture, classes.texture_source.unwrap_or(DEFAULT_LABEL));
        if life_stage == classes.life_stage {
            trace.record(Field::LifeStage, classes.life_stage_source.unwrap_or(DEFAULT_LABEL));
        } else {
            trace.record(Field::LifeStage, "senior_name");
        }

        let found = ingredients::extract(&ctx);
        trace.record(Field::Ingredients, found.strategy.as_str());

        let nutrients = nutrition::extract(&ctx);
        trace.record(Field::GuaranteedAnalysis, nutrients.ga_strategy);
        trace.record(Field::Calories, nutrients.calories_strategy);

        trace.image_count = doc.image_count();
        trace.text_length = doc.text().chars().count();
        trace.escalated = ctx.escalated();

        tracing::debug!(
            url = source.as_str(),
            brand = %brand.brand,
            escalated = trace.escalated,
            "extraction finished"
        );

        ProductRecord {
            source_url: source.as_str().to_string(),
            brand: brand.brand,
            name: display_name,
            size: naming.size,
            image_url: image.url,
            pet_type: classes.pet_type,
            texture: classify::join_textures(&classes.textures),
            life_stage,
            ingredients: found.ingredients,
            ingredients_note: found.note,
            guaranteed_analysis: nutrients.guaranteed_analysis,
            caloric_info: nutrients.caloric_info,
            extraction_trace: trace,
        }
    }

    /// Reduced record for a direct image link: everything comes from the URL.
    #[must_use]
    pub fn extract_from_url_only(&self, source_url: &str) -> PartialRecord {
        let source = SourceUrl::new(source_url);
        let url_lower = source.lower();
        let mut trace = ExtractionTrace::default();

        let (brand, brand_strategy) = brand::from_url_only(&url_lower, &self.lexicon);
        trace.record(Field::Brand, brand_strategy);
        trace.record(Field::Image, "direct_url");

        let corpus = Corpus::from_url(&url_lower);
        let classes = classify::classify(&corpus, &self.lexicon, self.options.texture_min_hits);
        trace.record(Field::PetType, classes.pet_type_source.unwrap_or(DEFAULT_LABEL));
        trace.record(Field::Texture, classes.texture_source.unwrap_or(DEFAULT_LABEL));
        trace.record(Field::LifeStage, classes.life_stage_source.unwrap_or(DEFAULT_LABEL));

        PartialRecord {
            source_url: source.as_str().to_string(),
            brand,
            image_url: source.as_str().to_string(),
            pet_type: classes.pet_type,
            texture: classify::join_textures(&classes.textures),
            life_stage: classes.life_stage,
            extraction_trace: trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{
        LifeStage, PetType, BRAND_NOT_FOUND, IMAGE_NOT_FOUND, INGREDIENTS_NOT_AVAILABLE,
        INGREDIENTS_NOT_AVAILABLE_FOR_IMAGE, NONE_SUCCESSFUL,
    };

    #[test]
    fn builtin_lexicon_is_shared_not_copied() {
        assert!(Arc::ptr_eq(&Extractor::new().lexicon, &Extractor::default().lexicon));
        assert!(std::ptr::eq(Extractor::new().lexicon(), Lexicon::builtin()));
    }

    #[test]
    fn direct_image_source_takes_reduced_path() {
        let doc = FetchedDocument::parse("<html><body><p>Ingredients: Chicken, Rice</p></body></html>");
        let record = Extractor::new().extract(&doc, "https://img.cdn.com/friskies-pate-kitten.jpg");
        assert_eq!(record.brand, "Purina Friskies");
        assert_eq!(record.image_url, "https://img.cdn.com/friskies-pate-kitten.jpg");
        assert_eq!(record.ingredients, None);
        assert_eq!(record.ingredients_note.as_deref(), Some(INGREDIENTS_NOT_AVAILABLE_FOR_IMAGE));
        assert_eq!(record.extraction_trace.strategy(Field::Image), Some("direct_url"));
    }

    #[test]
    fn empty_page_is_complete() {
        let doc = FetchedDocument::parse("");
        let record = Extractor::new().extract(&doc, "example.com/x");

        assert_eq!(record.source_url, "https://example.com/x");
        assert_eq!(record.brand, BRAND_NOT_FOUND);
        assert_eq!(record.image_url, IMAGE_NOT_FOUND);
        assert_eq!(record.texture, "dry");
        assert_eq!(record.life_stage, LifeStage::Adult);
        assert_eq!(record.pet_type, PetType::Unknown);
        assert_eq!(record.ingredients, None);
        assert_eq!(record.ingredients_note.as_deref(), Some(INGREDIENTS_NOT_AVAILABLE));
        assert_eq!(record.extraction_trace.strategy(Field::Brand), Some(NONE_SUCCESSFUL));
        assert_eq!(record.extraction_trace.strategy(Field::PetType), Some(DEFAULT_LABEL));
        assert!(!record.extraction_trace.escalated);
    }

    #[test]
    fn senior_name_is_traced() {
        let doc = FetchedDocument::parse(
            "<html><head><title>Senior Chicken Recipe for Kittens</title></head><body></body></html>",
        );
        let record = Extractor::new().extract(&doc, "https://example.com/p");
        assert_eq!(record.life_stage, LifeStage::Senior);
        assert_eq!(record.extraction_trace.strategy(Field::LifeStage), Some("senior_name"));
    }

    #[test]
    fn url_only_record() {
        let partial = Extractor::new().extract_from_url_only("https://cdn.example.com/purina-friskies-pate-kitten.jpg");
        assert_eq!(partial.brand, "Purina Friskies");
        assert_eq!(partial.pet_type, PetType::Cat);
        assert_eq!(partial.texture, "pate,wet");
        assert_eq!(partial.life_stage, LifeStage::Kitten);
        assert_eq!(partial.image_url, "https://cdn.example.com/purina-friskies-pate-kitten.jpg");
    }
}
