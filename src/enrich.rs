//! # Orchestrator
//! URL → validated enrichment result.
//!
//! Flow: canonicalize → cache → scrape → providers in mode order → fallback.
//! Provider failures never escape: they are joined into the fallback's
//! `error`. Only validation and scraping failures are returned as errors.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::cache::{MemoryCache, ResultCache};
use crate::clock::{Clock, SystemClock};
use crate::config::EnrichConfig;
use crate::error::{EnrichError, ProviderError};
use crate::fallback::fallback_analysis;
use crate::metrics as m;
use crate::providers::{self, DynProvider};
use crate::scrape::{ContentSource, HttpScraper};
use crate::site::canonicalize;
use crate::types::{Analysis, EnrichmentRequest, EnrichmentResult, ProviderId, ProviderMode};

/// Result plus whether it came from the cache.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub result: EnrichmentResult,
    pub cache_hit: bool,
}

pub struct Enricher {
    providers: Vec<DynProvider>,
    content: Arc<dyn ContentSource>,
    cache: Arc<dyn ResultCache>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    default_mode: ProviderMode,
}

impl Enricher {
    pub fn new(
        providers: Vec<DynProvider>,
        content: Arc<dyn ContentSource>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self {
            providers,
            content,
            cache,
            clock: Arc::new(SystemClock),
            ttl: crate::cache::DEFAULT_TTL,
            default_mode: ProviderMode::Google,
        }
    }

    /// Production wiring: real providers, HTTP scraper, in-memory cache.
    pub fn from_config(cfg: &EnrichConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let providers = providers::from_config(cfg, clock.clone())?;
        let scraper = HttpScraper::new(
            HttpScraper::client(cfg.http_timeout)?,
            cfg.scraper.clone(),
        );
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        Ok(Self::new(providers, Arc::new(scraper), cache)
            .with_clock(clock)
            .with_ttl(cfg.cache_ttl)
            .with_default_mode(cfg.default_mode))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_default_mode(mut self, mode: ProviderMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn default_mode(&self) -> ProviderMode {
        self.default_mode
    }

    fn provider(&self, id: ProviderId) -> Option<&DynProvider> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub async fn enrich(&self, req: &EnrichmentRequest) -> Result<Enrichment, EnrichError> {
        let started = Instant::now();
        let url = canonicalize(&req.url)?;

        if !req.force_refresh {
            if let Some(entry) = self.cache.get(&url, self.ttl) {
                counter!(m::CACHE_HITS).increment(1);
                info!(%url, provider = %entry.data.provider, "cache hit");
                return Ok(Enrichment {
                    result: entry.data.stamp(self.clock.now()),
                    cache_hit: true,
                });
            }
        }
        counter!(m::CACHE_MISSES).increment(1);

        let content = self.content.fetch(&url).await?;

        let analysis = match self.run_providers(req.mode, &content, &url).await {
            Ok(a) => a,
            Err(errors) => {
                counter!(m::FALLBACKS).increment(1);
                let mut fb = fallback_analysis(&url, self.clock.now());
                if !errors.is_empty() {
                    fb.error = Some(errors.join(" | "));
                }
                warn!(%url, errors = ?fb.error, "all providers failed, serving fallback");
                fb
            }
        };

        if analysis.provider.is_live() {
            self.cache.put(&url, analysis.clone());
        }

        histogram!(m::DURATION_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        Ok(Enrichment {
            result: analysis.stamp(self.clock.now()),
            cache_hit: false,
        })
    }

    /// Providers strictly in sequence; stop at the first success.
    async fn run_providers(
        &self,
        mode: ProviderMode,
        content: &str,
        url: &str,
    ) -> Result<Analysis, Vec<String>> {
        let mut errors = Vec::new();
        for &id in mode.order() {
            let Some(client) = self.provider(id) else {
                errors.push(ProviderError::unavailable(id).to_string());
                continue;
            };
            match client.analyze(content, url).await {
                Ok(analysis) => {
                    counter!(m::PROVIDER_SUCCESS, "provider" => id.as_str()).increment(1);
                    return Ok(analysis);
                }
                Err(e) => {
                    counter!(m::PROVIDER_FAILURES, "provider" => id.as_str()).increment(1);
                    warn!(provider = %id, error = %e, "provider failed");
                    errors.push(e.to_string());
                }
            }
        }
        Err(errors)
    }
}
