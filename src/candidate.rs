//! Unvalidated values produced by extraction strategies.

/// Where a candidate value was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// A `<meta>` tag or JSON-LD property.
    Meta,
    /// An image reference (`<img>` attribute, CSS, script URL).
    Image,
    /// Free text: DOM text, regex match, URL slug.
    Text,
}

/// A value awaiting validation, tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub value: String,
    pub source: &'static str,
}

impl Candidate {
    #[must_use]
    pub fn new(kind: CandidateKind, value: impl Into<String>, source: &'static str) -> Self {
        Self {
            kind,
            value: value.into(),
            source,
        }
    }

    #[must_use]
    pub fn meta(value: impl Into<String>, source: &'static str) -> Self {
        Self::new(CandidateKind::Meta, value, source)
    }

    #[must_use]
    pub fn image(value: impl Into<String>, source: &'static str) -> Self {
        Self::new(CandidateKind::Image, value, source)
    }

    #[must_use]
    pub fn text(value: impl Into<String>, source: &'static str) -> Self {
        Self::new(CandidateKind::Text, value, source)
    }

    /// Trimmed value.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }
}
