//! # Provider clients
//! Each backend turns `(content, url)` into an [`Analysis`].
//!
//! The shared [`HttpProvider`] walks an explicit plan of `(key, model)`
//! pairs, key outermost and model innermost, one HTTP call at a time:
//! - 429/5xx are retried inside the call by [`RetryPolicy`]
//! - any other failure for a pair (status, transport, empty text,
//!   unparseable text) is recorded and the plan advances
//! - the first pair that yields a JSON object wins
//!
//! An empty key pool fails the provider before any call is made.

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{EnrichConfig, ProviderSettings};
use crate::error::ProviderError;
use crate::extract::extract_json_object;
use crate::normalize::normalize;
use crate::retry::RetryPolicy;
use crate::types::{Analysis, ProviderId};

pub use anthropic::Anthropic;
pub use google::Gemini;
pub use openai::OpenAi;

const USER_AGENT: &str = concat!("company-enricher/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn id(&self) -> ProviderId;
    async fn analyze(&self, content: &str, url: &str) -> Result<Analysis, ProviderError>;
}

pub type DynProvider = Arc<dyn ProviderClient>;

/// Vendor-specific request shape and response slice.
pub trait Backend: Send + Sync + 'static {
    fn id(&self) -> ProviderId;
    fn request(&self, http: &Client, attempt: &Attempt<'_>, prompt: &str) -> RequestBuilder;
    /// The one text field this system reads from a 2xx body.
    fn response_text(&self, body: &[u8]) -> Option<String>;
}

/// One `(credential, model)` pair of the plan.
#[derive(Clone, Copy)]
pub struct Attempt<'a> {
    pub base_url: &'a str,
    pub key_index: usize,
    pub key: &'a str,
    pub model: &'a str,
}

/// Builder with the user agent and timeouts every outbound call uses.
pub fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
}

/// HTTP client for vendor calls.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    client_builder(timeout).build()
}

pub struct HttpProvider<B: Backend> {
    backend: B,
    settings: ProviderSettings,
    http: Client,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl<B: Backend> HttpProvider<B> {
    pub fn new(backend: B, settings: ProviderSettings, http: Client) -> Self {
        Self {
            backend,
            settings,
            http,
            retry: RetryPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Keys outermost, models innermost.
    fn plan(&self) -> Vec<Attempt<'_>> {
        let base_url = self.settings.base_url.as_str();
        self.settings
            .keys
            .keys()
            .iter()
            .enumerate()
            .flat_map(|(key_index, key)| {
                self.settings.models.models().iter().map(move |model| Attempt {
                    base_url,
                    key_index,
                    key: key.as_str(),
                    model: model.as_str(),
                })
            })
            .collect()
    }

    async fn attempt_text(&self, attempt: &Attempt<'_>, prompt: &str) -> Result<String, ProviderError> {
        let label = self.backend.id().label();
        let resp = self
            .retry
            .execute(|| self.backend.request(&self.http, attempt, prompt))
            .await
            .map_err(|source| ProviderError::Transport {
                provider: label,
                source,
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|source| ProviderError::Transport {
            provider: label,
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Http {
                provider: label,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        self.backend
            .response_text(&body)
            .ok_or(ProviderError::EmptyResponse(label))
    }
}

#[async_trait]
impl<B: Backend> ProviderClient for HttpProvider<B> {
    fn id(&self) -> ProviderId {
        self.backend.id()
    }

    async fn analyze(&self, content: &str, url: &str) -> Result<Analysis, ProviderError> {
        let id = self.backend.id();
        if self.settings.keys.is_empty() {
            return Err(ProviderError::MissingCredential(self.settings.primary_key_var));
        }

        let prompt = prompt::build_prompt(content, url);
        let plan = self.plan();
        let mut last_error = None;

        for attempt in &plan {
            debug!(provider = %id, model = attempt.model, key_index = attempt.key_index, "provider attempt");
            let outcome = self.attempt_text(attempt, &prompt).await.and_then(|text| {
                extract_json_object(&text).map_err(|source| ProviderError::Malformed {
                    provider: id.label(),
                    source,
                })
            });
            match outcome {
                Ok(parsed) => {
                    info!(provider = %id, model = attempt.model, key_index = attempt.key_index, "provider succeeded");
                    return Ok(normalize(&parsed, url, id, self.clock.now()));
                }
                Err(e) => {
                    warn!(
                        provider = %id,
                        model = attempt.model,
                        key_index = attempt.key_index,
                        error = %e,
                        "provider attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ProviderError::RequestFailed(id.label())))
    }
}

/// Build all three clients from config, sharing one HTTP client.
pub fn from_config(cfg: &EnrichConfig, clock: Arc<dyn Clock>) -> reqwest::Result<Vec<DynProvider>> {
    let http = http_client(cfg.http_timeout)?;
    let google: DynProvider = Arc::new(
        HttpProvider::new(Gemini, cfg.google.clone(), http.clone())
            .with_retry(cfg.retry)
            .with_clock(clock.clone()),
    );
    let openai: DynProvider = Arc::new(
        HttpProvider::new(OpenAi, cfg.openai.clone(), http.clone())
            .with_retry(cfg.retry)
            .with_clock(clock.clone()),
    );
    let anthropic: DynProvider = Arc::new(
        HttpProvider::new(Anthropic, cfg.anthropic.clone(), http)
            .with_retry(cfg.retry)
            .with_clock(clock),
    );
    Ok(vec![google, openai, anthropic])
}

/// Keep a vendor text field only if it is a non-blank string.
pub(crate) fn usable_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<Value>,
}

/// Vendor `error.message` when present, else a short prefix of the body.
fn error_message(body: &[u8]) -> String {
    let from_envelope = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|d| usable_text(d.message.as_ref()));
    if let Some(msg) = from_envelope {
        return msg;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        "request failed".to_string()
    } else {
        prompt::truncate_chars(text, 300).to_string()
    }
}
