//! Error taxonomy for the enrichment pipeline.
//!
//! Only [`ValidationError`] and [`ScrapeError`] ever reach a caller as hard
//! failures. Provider errors are collected per provider and folded into the
//! fallback result.

use thiserror::Error;

use crate::types::ProviderId;

/// Bad or missing input URL. Never retried, never masked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("url is required")]
    MissingUrl,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("url host is not allowed: {0}")]
    DisallowedHost(String),
}

/// The content-scraping collaborator could not produce text.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch website content: {0}")]
    Fetch(String),
    #[error("website returned HTTP {0}")]
    Status(u16),
    #[error("website returned no readable content")]
    Empty,
}

/// No JSON object could be recovered from model output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response is not valid JSON")]
pub struct ExtractError;

/// Failure of one provider client. Recovered locally by the orchestrator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    MissingCredential(&'static str),
    #[error("{provider} API error ({status}): {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{provider} request error: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
    #[error("{provider} {source}")]
    Malformed {
        provider: &'static str,
        #[source]
        source: ExtractError,
    },
    #[error("{0} request failed")]
    RequestFailed(&'static str),
    #[error("{0} provider is not available")]
    Unavailable(&'static str),
}

impl ProviderError {
    pub fn unavailable(id: ProviderId) -> Self {
        ProviderError::Unavailable(id.label())
    }
}

/// Hard failures of [`crate::enrich::Enricher::enrich`].
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Content(#[from] ScrapeError),
}
