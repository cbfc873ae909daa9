//! Configuration options for product extraction.
//!
//! The `Options` struct tunes the heuristics: text windows fed to the
//! classifiers, ingredient span limits, the plausible calorie range and
//! whether rendered-DOM escalation may be attempted.

use std::ops::RangeInclusive;

/// Configuration options for product extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use petfood_extract::Options;
///
/// let options = Options {
///     combine_name_and_size: false,
///     texture_min_hits: 2,
///     ..Options::default()
/// };
/// assert!(options.escalation_enabled);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Render the product name as `"Name (Size)"` when a size was found.
    ///
    /// Default: `true`
    pub combine_name_and_size: bool,

    /// Hard ceiling on the length of a harvested ingredient span (characters).
    ///
    /// Default: `4000`
    pub max_ingredient_span: usize,

    /// Window at the start of a candidate where primary-starter hits count.
    ///
    /// Default: `100`
    pub ingredient_prefix_window: usize,

    /// Characters of the main content region added to the classifier corpus.
    ///
    /// Default: `1000`
    pub corpus_content_chars: usize,

    /// Characters of the whole body added to the classifier corpus.
    ///
    /// Default: `3000`
    pub corpus_body_chars: usize,

    /// Keyword hits a texture category needs before it is reported.
    ///
    /// Default: `1`
    pub texture_min_hits: usize,

    /// Plausible kcal/kg magnitudes. Values outside are treated as stray numbers.
    ///
    /// Default: `500..=6000`
    pub calorie_range: RangeInclusive<u32>,

    /// Allow rendered-DOM escalation when an escalator is configured.
    ///
    /// Default: `true`
    pub escalation_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            combine_name_and_size: true,
            max_ingredient_span: 4000,
            ingredient_prefix_window: 100,
            corpus_content_chars: 1000,
            corpus_body_chars: 3000,
            texture_min_hits: 1,
            calorie_range: 500..=6000,
            escalation_enabled: true,
        }
    }
}
