// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod metrics;
pub mod normalize;
pub mod providers;
pub mod retry;
pub mod scrape;
pub mod site;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::enrich::{Enricher, Enrichment};
pub use crate::types::{EnrichmentRequest, EnrichmentResult, ProviderId, ProviderMode};

use axum::Router;
use tracing::info;

/// Build the full in-process app from the environment.
/// Used by the binary entrypoint and by router-level tests.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = config::EnrichConfig::from_env();
    let cache_ttl_ms = clock::millis_u64(cfg.cache_ttl);
    info!(
        default_mode = ?cfg.default_mode,
        google_keys = cfg.google.keys.len(),
        openai_keys = cfg.openai.keys.len(),
        anthropic_keys = cfg.anthropic.keys.len(),
        cache_ttl_ms,
        "enrichment config loaded"
    );
    let enricher = Enricher::from_config(&cfg)?;
    let handle = metrics::init(cache_ttl_ms);
    let state = api::AppState::new(enricher).with_metrics(handle);
    Ok(api::router(state))
}
