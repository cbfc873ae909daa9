//! Error types for petfood-extract.
//!
//! Extraction itself never fails: every field degrades to a documented
//! sentinel. These errors surface from the parts around the engine
//! (lexicon loading, the store, the fetcher, browser escalation) and are
//! used internally by strategies so the chain runner can log why a
//! candidate was skipped.

/// Error type for loaders, plumbing and individual strategies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A page URL could not be parsed.
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A single extraction strategy gave up.
    #[error("Strategy `{strategy}` failed: {reason}")]
    Strategy {
        strategy: &'static str,
        reason: String,
    },

    /// A lexicon table could not be loaded.
    #[error("Lexicon could not be loaded: {0}")]
    Lexicon(String),

    /// Browser escalation failed (dead session, element not found, timeout).
    #[error("Browser escalation failed: {0}")]
    Escalation(String),

    /// The upstream fetch layer failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Store or lexicon file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn strategy(strategy: &'static str, reason: impl Into<String>) -> Self {
        Self::Strategy {
            strategy,
            reason: reason.into(),
        }
    }
}

/// Categorized failure of the upstream fetch layer.
///
/// The engine never retries; these only describe why a document never
/// reached it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a 4xx status.
    #[error("Client error status {0}")]
    ClientStatus(u16),

    /// The server answered with a 5xx status.
    #[error("Server error status {0}")]
    ServerStatus(u16),

    /// Connection, DNS or TLS failure.
    #[error("Network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Whether a bounded retry is worthwhile for this failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ClientStatus(_))
    }
}

/// Result type alias for fallible operations.
pub type Result<T> = std::result::Result<T, Error>;
