use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

pub const CACHE_HITS: &str = "enrich_cache_hits_total";
pub const CACHE_MISSES: &str = "enrich_cache_misses_total";
pub const PROVIDER_SUCCESS: &str = "enrich_provider_success_total";
pub const PROVIDER_FAILURES: &str = "enrich_provider_failures_total";
pub const FALLBACKS: &str = "enrich_fallback_total";
pub const DURATION_MS: &str = "enrich_duration_ms";
pub const CACHE_TTL_MS: &str = "enrich_cache_ttl_ms";

/// Install the Prometheus recorder once per process.
///
/// Returns `None` if another recorder was installed first (e.g. by a host
/// runtime); metrics calls then go to that recorder.
pub fn init(ttl_ms: u64) -> Option<PrometheusHandle> {
    static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();
    let handle = HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(h) => {
                describe();
                Some(h)
            }
            Err(e) => {
                warn!(error = %e, "prometheus recorder not installed");
                None
            }
        })
        .clone();

    // Static gauge with the current TTL (absolute TTL, no sliding refresh)
    gauge!(CACHE_TTL_MS).set(ttl_ms as f64);
    handle
}

fn describe() {
    describe_counter!(CACHE_HITS, "Enrichments served from the result cache.");
    describe_counter!(CACHE_MISSES, "Enrichments that went to providers.");
    describe_counter!(PROVIDER_SUCCESS, "Provider calls that produced a result.");
    describe_counter!(PROVIDER_FAILURES, "Provider calls that failed.");
    describe_counter!(FALLBACKS, "Enrichments answered with the placeholder result.");
    describe_histogram!(DURATION_MS, "End-to-end enrichment time in milliseconds.");
    describe_gauge!(CACHE_TTL_MS, "Configured cache TTL in milliseconds.");
}

/// Router exposing `/metrics` in the Prometheus exposition format.
pub fn router<S>(handle: Option<PrometheusHandle>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/metrics",
        get(move || {
            let h = handle.clone();
            async move {
                match h {
                    Some(h) => h.render(),
                    None => String::new(),
                }
            }
        }),
    )
}
