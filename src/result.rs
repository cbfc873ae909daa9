//! Result types for extraction output.
//!
//! A `ProductRecord` is assembled once per scrape and never updated in
//! place. Missing fields carry documented sentinels so the record is always
//! structurally complete.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Brand sentinel after every brand strategy failed.
pub const BRAND_NOT_FOUND: &str = "Brand not found";

/// Image sentinel after every image strategy failed.
pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Note attached when ingredient extraction ran and found nothing.
pub const INGREDIENTS_NOT_AVAILABLE: &str = "Ingredients not available";

/// Note attached on the direct-image path, where ingredients are never attempted.
pub const INGREDIENTS_NOT_AVAILABLE_FOR_IMAGE: &str =
    "Ingredients not available for direct image URLs";

/// Strategy name recorded when a chain is exhausted.
pub const NONE_SUCCESSFUL: &str = "none_successful";

/// Field identifiers used by the chain runner and the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Brand,
    Name,
    Size,
    Image,
    PetType,
    Texture,
    LifeStage,
    Ingredients,
    GuaranteedAnalysis,
    Calories,
}

impl Field {
    /// Stable trace key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Name => "name",
            Self::Size => "size",
            Self::Image => "imageUrl",
            Self::PetType => "petType",
            Self::Texture => "texture",
            Self::LifeStage => "lifeStage",
            Self::Ingredients => "ingredients",
            Self::GuaranteedAnalysis => "guaranteedAnalysis",
            Self::Calories => "caloricInfo",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Cat,
    Dog,
    #[default]
    Unknown,
}

impl PetType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Dog => "dog",
            Self::Unknown => "unknown",
        }
    }
}

/// Target age category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeStage {
    Kitten,
    Puppy,
    #[default]
    Adult,
    Senior,
    All,
}

impl LifeStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kitten => "kitten",
            Self::Puppy => "puppy",
            Self::Adult => "adult",
            Self::Senior => "senior",
            Self::All => "all",
        }
    }
}

/// Physical form of the food, in output priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Texture {
    Treats,
    Toppers,
    Pate,
    Wet,
    Dry,
    FreezeDried,
    AirDried,
    Raw,
}

impl Texture {
    /// Every texture, highest priority first.
    pub const PRIORITY: [Texture; 8] = [
        Self::Treats,
        Self::Toppers,
        Self::Pate,
        Self::Wet,
        Self::Dry,
        Self::FreezeDried,
        Self::AirDried,
        Self::Raw,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Treats => "treats",
            Self::Toppers => "toppers",
            Self::Pate => "pate",
            Self::Wet => "wet",
            Self::Dry => "dry",
            Self::FreezeDried => "freeze-dried",
            Self::AirDried => "air-dried",
            Self::Raw => "raw",
        }
    }
}

/// Caloric content as matched on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaloricInfo {
    /// Raw `"N kcal/kg"` string.
    pub calories: String,

    /// Per-unit figure found right after the kcal/kg value (`"34.4 kcal/oz"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_unit: Option<String>,
}

/// Which strategy satisfied each field, plus raw counts for debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionTrace {
    /// Field trace key -> winning strategy name (or `none_successful`).
    pub strategies: BTreeMap<String, String>,

    /// Number of `<img>` elements in the static document.
    pub image_count: usize,

    /// Length of the flattened page text.
    pub text_length: usize,

    /// Whether a rendered DOM was consulted.
    pub escalated: bool,
}

impl ExtractionTrace {
    pub(crate) fn record(&mut self, field: Field, strategy: impl Into<String>) {
        self.strategies.insert(field.as_str().to_string(), strategy.into());
    }

    /// Strategy recorded for a field, if any.
    #[must_use]
    pub fn strategy(&self, field: Field) -> Option<&str> {
        self.strategies.get(field.as_str()).map(String::as_str)
    }
}

/// Output of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Original input, normalized to include a scheme.
    pub source_url: String,

    /// Resolved brand or [`BRAND_NOT_FOUND`].
    pub brand: String,

    /// Product title, optionally `"Name (Size)"`.
    pub name: Option<String>,

    /// Normalized quantity+unit (`"30lb"`).
    pub size: Option<String>,

    /// Absolute image URL or [`IMAGE_NOT_FOUND`].
    pub image_url: String,

    pub pet_type: PetType,

    /// Comma-joined textures in priority order. Never empty.
    pub texture: String,

    pub life_stage: LifeStage,

    /// Cleaned ingredient tokens in source order.
    pub ingredients: Option<Vec<String>>,

    /// Explanation when `ingredients` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients_note: Option<String>,

    /// Canonical guaranteed-analysis string.
    pub guaranteed_analysis: Option<String>,

    pub caloric_info: Option<CaloricInfo>,

    pub extraction_trace: ExtractionTrace,
}

impl ProductRecord {
    /// Whether the brand chain found anything.
    #[must_use]
    pub fn has_brand(&self) -> bool {
        self.brand != BRAND_NOT_FOUND
    }

    /// Whether the image chain found anything.
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.image_url != IMAGE_NOT_FOUND
    }

    /// Texture values as a list.
    #[must_use]
    pub fn textures(&self) -> Vec<&str> {
        self.texture.split(',').map(str::trim).collect()
    }
}

/// Reduced record for a direct image URL: no DOM, so only URL-derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRecord {
    pub source_url: String,
    pub brand: String,
    pub image_url: String,
    pub pet_type: PetType,
    pub texture: String,
    pub life_stage: LifeStage,
    pub extraction_trace: ExtractionTrace,
}

impl From<PartialRecord> for ProductRecord {
    fn from(partial: PartialRecord) -> Self {
        let mut trace = partial.extraction_trace;
        for field in [Field::Ingredients, Field::GuaranteedAnalysis, Field::Calories] {
            trace.record(field, "not_applicable");
        }

        Self {
            source_url: partial.source_url,
            brand: partial.brand,
            name: None,
            size: None,
            image_url: partial.image_url,
            pet_type: partial.pet_type,
            texture: partial.texture,
            life_stage: partial.life_stage,
            ingredients: None,
            ingredients_note: Some(INGREDIENTS_NOT_AVAILABLE_FOR_IMAGE.to_string()),
            guaranteed_analysis: None,
            caloric_info: None,
            extraction_trace: trace,
        }
    }
}
