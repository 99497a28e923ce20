// tests/common/mod.rs
//
// Shared fakes for orchestrator and router tests: a scripted provider, a
// fixed content source, and a manual clock starting at a known instant.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use company_enricher::cache::MemoryCache;
use company_enricher::clock::{Clock, ManualClock};
use company_enricher::config::{CredentialPool, ProviderSettings};
use company_enricher::error::{ProviderError, ScrapeError};
use company_enricher::providers::{http_client, DynProvider, HttpProvider, OpenAi, ProviderClient};
use company_enricher::scrape::ContentSource;
use company_enricher::types::{Analysis, CompanyDetails, LiveProvider, ProviderId, SourceRef};
use company_enricher::Enricher;

pub enum Script {
    Succeed,
    FailMissingKey(&'static str),
}

pub struct StubProvider {
    pub id: ProviderId,
    script: Script,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn ok(id: ProviderId) -> Arc<Self> {
        Arc::new(Self {
            id,
            script: Script::Succeed,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(id: ProviderId, var: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id,
            script: Script::FailMissingKey(var),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn live_analysis(id: ProviderId, url: &str) -> Analysis {
    Analysis {
        summary: format!("Analysis by {id}"),
        what_they_do: vec!["Builds rockets".into()],
        keywords: vec!["space".into(), "launch".into()],
        signals: vec!["Hiring engineers".into()],
        company_details: Some(CompanyDetails {
            founded: Some("2002".into()),
            ..CompanyDetails::default()
        }),
        sources: vec![SourceRef {
            url: url.to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        }],
        provider: id,
        error: None,
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn analyze(&self, _content: &str, url: &str) -> Result<Analysis, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Succeed => Ok(live_analysis(self.id, url)),
            Script::FailMissingKey(var) => Err(ProviderError::MissingCredential(var)),
        }
    }
}

pub struct StubContent {
    text: Option<String>,
    calls: AtomicUsize,
}

impl StubContent {
    pub fn text(t: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(t.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for StubContent {
    async fn fetch(&self, _url: &str) -> Result<String, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| ScrapeError::Fetch("connection refused".into()))
    }
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ))
}

/// Enricher over the given providers with a fresh cache sharing `clock`.
pub fn enricher(
    providers: Vec<DynProvider>,
    content: Arc<dyn ContentSource>,
    clock: Arc<ManualClock>,
) -> Enricher {
    let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
    let clock: Arc<dyn Clock> = clock;
    Enricher::new(providers, content, cache).with_clock(clock)
}

/// Real OpenAI client with an empty key pool: fails before any network call.
pub fn openai_without_key() -> DynProvider {
    let settings = ProviderSettings::new(LiveProvider::OpenAi, CredentialPool::default());
    let http = http_client(std::time::Duration::from_secs(5)).expect("http client");
    Arc::new(HttpProvider::new(OpenAi, settings, http))
}
