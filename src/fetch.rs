//! Blocking page fetcher.
//!
//! Plain HTTP with a desktop browser user-agent. Timeouts, 5xx answers and
//! network failures are retried a bounded number of times with exponential
//! backoff; 4xx answers are returned at once.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::document::FetchedDocument;
use crate::error::{FetchError, Result};
use crate::url_utils::parse_source_url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/124.0.0.0 Safari/537.36";

/// Fetcher settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further one.
    pub backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Raw response body with the bits the engine cares about.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub bytes: Vec<u8>,
    pub status: u16,
    pub content_type: Option<String>,
    /// URL after redirects.
    pub final_url: String,
}

impl FetchedPage {
    /// Decode (charset from `Content-Type`, then `<meta>`) and parse.
    #[must_use]
    pub fn into_document(self) -> FetchedDocument {
        FetchedDocument::from_bytes(&self.bytes, self.content_type.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// GET `url`, retrying transient failures.
    ///
    /// A missing scheme is filled in with `https://`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`](crate::Error::InvalidUrl) before any request
    /// when the URL does not parse, otherwise the last [`FetchError`].
    pub fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = parse_source_url(url)?;
        let url = parsed.as_str();
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url) {
                Ok(page) => return Ok(page),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    tracing::warn!(url, attempt, error = %err, "fetch failed, retrying in {delay:?}");
                    thread::sleep(delay);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn fetch_once(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().map_err(classify)?;
        let status = response.status().as_u16();
        check_status(status)?;

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().map_err(classify)?.to_vec();

        tracing::debug!(url, status, len = bytes.len(), "fetched");
        Ok(FetchedPage {
            bytes,
            status,
            content_type,
            final_url,
        })
    }
}

fn check_status(status: u16) -> std::result::Result<(), FetchError> {
    match status {
        400..=499 => Err(FetchError::ClientStatus(status)),
        500..=599 => Err(FetchError::ServerStatus(status)),
        _ => Ok(()),
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else if let Some(status) = err.status() {
        check_status(status.as_u16())
            .err()
            .unwrap_or_else(|| FetchError::Network(err.to_string()))
    } else {
        FetchError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        assert_eq!(check_status(200), Ok(()));
        assert_eq!(check_status(404), Err(FetchError::ClientStatus(404)));
        assert_eq!(check_status(503), Err(FetchError::ServerStatus(503)));
    }

    #[test]
    fn malformed_url_fails_before_any_request() {
        let fetcher = Fetcher::new().expect("client builds");
        let err = fetcher.fetch("not a url").expect_err("rejected");
        assert!(matches!(err, crate::Error::InvalidUrl { .. }), "{err}");
    }

    #[test]
    fn page_decodes_with_header_charset() {
        let page = FetchedPage {
            bytes: b"<html><head><title>Caf\xe9 Kibble</title></head></html>".to_vec(),
            status: 200,
            content_type: Some("text/html; charset=iso-8859-1".to_string()),
            final_url: "https://example.com/".to_string(),
        };
        assert_eq!(page.into_document().title().as_deref(), Some("Café Kibble"));
    }
}
