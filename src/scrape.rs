//! Website content acquisition.
//!
//! The orchestrator only needs `url → text`. [`HttpScraper`] fetches the
//! page directly and, when that fails and a key is configured, retries
//! through a reader service that returns pre-rendered text.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::ScraperSettings;
use crate::error::ScrapeError;
use crate::providers::client_builder;
use crate::site::is_disallowed_url;

const MAX_REDIRECTS: usize = 10;

#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

pub struct HttpScraper {
    http: Client,
    settings: ScraperSettings,
}

impl HttpScraper {
    pub fn new(http: Client, settings: ScraperSettings) -> Self {
        Self { http, settings }
    }

    /// Client whose redirects go through the same host guard as user input.
    pub fn client(timeout: Duration) -> reqwest::Result<Client> {
        client_builder(timeout).redirect(guarded_redirects()).build()
    }

    async fn fetch_direct(&self, url: &str) -> Result<String, ScrapeError> {
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ScrapeError::Status(resp.status().as_u16()));
        }
        let html = resp
            .text()
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        non_empty(html_to_text(&html))
    }

    async fn fetch_via_reader(&self, key: &str, url: &str) -> Result<String, ScrapeError> {
        let endpoint = format!("{}{}", self.settings.fallback_url, url);
        let resp = self
            .http
            .get(endpoint)
            .bearer_auth(key)
            .header("accept", "text/plain")
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ScrapeError::Status(resp.status().as_u16()));
        }
        let text = resp
            .text()
            .await
            .map_err(|e| ScrapeError::Fetch(e.to_string()))?;
        non_empty(collapse_ws(&text))
    }
}

#[async_trait]
impl ContentSource for HttpScraper {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        match self.fetch_direct(url).await {
            Ok(text) => {
                debug!(url, chars = text.chars().count(), "scraped page");
                Ok(text)
            }
            Err(e) => match self.settings.fallback_api_key.as_deref() {
                Some(key) => {
                    warn!(url, error = %e, "direct fetch failed, trying reader fallback");
                    self.fetch_via_reader(key, url).await
                }
                None => Err(e),
            },
        }
    }
}

fn guarded_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_disallowed_url(attempt.url()) {
            warn!(target_url = %attempt.url(), "refusing redirect to disallowed host");
            let msg = format!("redirect to disallowed host: {}", attempt.url());
            attempt.error(msg)
        } else {
            attempt.follow()
        }
    })
}

fn non_empty(text: String) -> Result<String, ScrapeError> {
    if text.is_empty() {
        Err(ScrapeError::Empty)
    } else {
        Ok(text)
    }
}

/// Drop scripts/styles/markup, decode entities, collapse whitespace.
pub fn html_to_text(html: &str) -> String {
    static RE_BLOCKS: OnceCell<Regex> = OnceCell::new();
    let re_blocks = RE_BLOCKS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|noscript|svg|template)\b[^>]*>.*?</(script|style|noscript|svg|template)\s*>|<!--.*?-->")
            .expect("block regex")
    });
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("tag regex"));

    let out = re_blocks.replace_all(html, " ");
    let out = re_tags.replace_all(&out, " ");
    let out = html_escape::decode_html_entities(&out);
    collapse_ws(&out)
}

fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    re_ws.replace_all(s, " ").trim().to_string()
}
