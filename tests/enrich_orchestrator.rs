// tests/enrich_orchestrator.rs
//
// Orchestrator behavior with scripted providers and a manual clock.
//
// Covered:
// - cache hit within TTL: same content, fresh enrichedAt, providers not called
// - forceRefresh bypasses the cache
// - TTL expiry goes back to providers
// - fallback results are never cached
// - auto mode order + stop at first success
// - provider errors joined with " | " into the fallback
// - validation and content failures surface as hard errors

mod common;

use std::time::Duration;

use company_enricher::error::{EnrichError, ValidationError};
use company_enricher::providers::DynProvider;
use company_enricher::types::{EnrichmentRequest, ProviderId, ProviderMode};

use common::{enricher, manual_clock, openai_without_key, StubContent, StubProvider};

const URL: &str = "https://example.com";
const CANONICAL: &str = "https://example.com/";

#[tokio::test]
async fn second_call_within_ttl_is_cache_hit_with_fresh_timestamp() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let content = StubContent::text("Example Inc builds things.");
    let e = enricher(vec![google.clone() as DynProvider], content.clone(), clock.clone());

    let req = EnrichmentRequest::new(URL, ProviderMode::Google);
    let first = e.enrich(&req).await.expect("first enrich");
    assert!(!first.cache_hit);

    clock.advance(Duration::from_secs(10));
    let second = e.enrich(&req).await.expect("second enrich");
    assert!(second.cache_hit);

    assert_eq!(google.calls(), 1, "provider must not be called on cache hit");
    assert_eq!(content.calls(), 1, "scraper must not be called on cache hit");
    assert_eq!(first.result.analysis, second.result.analysis);
    assert_eq!(second.result.analysis.provider, ProviderId::Google);
    assert_ne!(first.result.enriched_at, second.result.enriched_at);
    assert_eq!(second.result.enriched_at, "2025-03-01T09:00:10.000Z");
}

#[tokio::test]
async fn force_refresh_always_calls_providers() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let e = enricher(
        vec![google.clone() as DynProvider],
        StubContent::text("content"),
        clock,
    );

    let req = EnrichmentRequest::new(URL, ProviderMode::Google);
    e.enrich(&req).await.expect("prime");
    let forced = e
        .enrich(&req.clone().force_refresh(true))
        .await
        .expect("forced");

    assert!(!forced.cache_hit);
    assert_eq!(google.calls(), 2);
}

#[tokio::test]
async fn stale_entry_goes_back_to_provider() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let e = enricher(
        vec![google.clone() as DynProvider],
        StubContent::text("content"),
        clock.clone(),
    );

    let req = EnrichmentRequest::new(URL, ProviderMode::Google);
    e.enrich(&req).await.expect("prime");
    clock.advance(Duration::from_secs(5 * 60 + 1));
    let again = e.enrich(&req).await.expect("after ttl");

    assert!(!again.cache_hit);
    assert_eq!(google.calls(), 2);
}

#[tokio::test]
async fn fallback_results_are_never_cached() {
    let clock = manual_clock();
    let google = StubProvider::failing(ProviderId::Google, "GEMINI_API_KEY");
    let e = enricher(
        vec![google.clone() as DynProvider],
        StubContent::text("content"),
        clock.clone(),
    );

    let req = EnrichmentRequest::new(URL, ProviderMode::Google);
    let a = e.enrich(&req).await.expect("first");
    clock.advance(Duration::from_secs(1));
    let b = e.enrich(&req).await.expect("second");

    assert_eq!(a.result.analysis.provider, ProviderId::Fallback);
    assert_eq!(b.result.analysis.provider, ProviderId::Fallback);
    assert!(!a.cache_hit && !b.cache_hit);
    assert_eq!(google.calls(), 2);
    assert_ne!(a.result.enriched_at, b.result.enriched_at);
}

#[tokio::test]
async fn auto_mode_stops_at_first_success() {
    let clock = manual_clock();
    let google = StubProvider::failing(ProviderId::Google, "GEMINI_API_KEY");
    let openai = StubProvider::ok(ProviderId::OpenAi);
    let anthropic = StubProvider::ok(ProviderId::Anthropic);
    let e = enricher(
        vec![
            anthropic.clone() as DynProvider,
            openai.clone() as DynProvider,
            google.clone() as DynProvider,
        ],
        StubContent::text("content"),
        clock,
    );

    let out = e
        .enrich(&EnrichmentRequest::new(URL, ProviderMode::Auto))
        .await
        .expect("enrich");

    assert_eq!(out.result.analysis.provider, ProviderId::OpenAi);
    assert_eq!(google.calls(), 1);
    assert_eq!(openai.calls(), 1);
    assert_eq!(anthropic.calls(), 0, "chain must stop at first success");
    assert!(out.result.analysis.error.is_none());
}

#[tokio::test]
async fn auto_mode_all_failing_joins_errors_in_order() {
    let clock = manual_clock();
    let e = enricher(
        vec![
            StubProvider::failing(ProviderId::Google, "GEMINI_API_KEY") as DynProvider,
            StubProvider::failing(ProviderId::OpenAi, "OPENAI_API_KEY") as DynProvider,
            StubProvider::failing(ProviderId::Anthropic, "ANTHROPIC_API_KEY") as DynProvider,
        ],
        StubContent::text("content"),
        clock,
    );

    let out = e
        .enrich(&EnrichmentRequest::new(URL, ProviderMode::Auto))
        .await
        .expect("enrich");

    let a = &out.result.analysis;
    assert_eq!(a.provider, ProviderId::Fallback);
    assert_eq!(
        a.error.as_deref(),
        Some(
            "GEMINI_API_KEY is not configured | OPENAI_API_KEY is not configured | \
             ANTHROPIC_API_KEY is not configured"
        )
    );
    assert_eq!(a.sources.len(), 1);
    assert_eq!(a.sources[0].url, CANONICAL);
}

#[tokio::test]
async fn explicit_mode_tries_only_that_provider() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let anthropic = StubProvider::failing(ProviderId::Anthropic, "ANTHROPIC_API_KEY");
    let e = enricher(
        vec![google.clone() as DynProvider, anthropic.clone() as DynProvider],
        StubContent::text("content"),
        clock,
    );

    let out = e
        .enrich(&EnrichmentRequest::new(URL, ProviderMode::Anthropic))
        .await
        .expect("enrich");

    assert_eq!(out.result.analysis.provider, ProviderId::Fallback);
    assert_eq!(anthropic.calls(), 1);
    assert_eq!(google.calls(), 0);
}

#[tokio::test]
async fn openai_without_key_yields_fallback_with_credential_error() {
    let clock = manual_clock();
    let e = enricher(vec![openai_without_key()], StubContent::text("content"), clock);

    let out = e
        .enrich(&EnrichmentRequest::new(URL, ProviderMode::OpenAi))
        .await
        .expect("enrich");

    let a = &out.result.analysis;
    assert_eq!(a.provider, ProviderId::Fallback);
    assert!(a
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("OPENAI_API_KEY is not configured"));
    assert!(!a.sources.is_empty());
}

#[tokio::test]
async fn unregistered_provider_is_reported_not_panicked() {
    let clock = manual_clock();
    let e = enricher(vec![], StubContent::text("content"), clock);

    let out = e
        .enrich(&EnrichmentRequest::new(URL, ProviderMode::Google))
        .await
        .expect("enrich");

    assert_eq!(out.result.analysis.provider, ProviderId::Fallback);
    assert_eq!(
        out.result.analysis.error.as_deref(),
        Some("Gemini provider is not available")
    );
}

#[tokio::test]
async fn invalid_url_fails_before_scraping() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let content = StubContent::text("content");
    let e = enricher(vec![google.clone() as DynProvider], content.clone(), clock);

    let err = e
        .enrich(&EnrichmentRequest::new("http://127.0.0.1:8080/admin", ProviderMode::Google))
        .await
        .expect_err("loopback must be rejected");

    assert!(matches!(
        err,
        EnrichError::Validation(ValidationError::DisallowedHost(_))
    ));
    assert_eq!(content.calls(), 0);
    assert_eq!(google.calls(), 0);
}

#[tokio::test]
async fn scraping_failure_is_not_masked_by_fallback() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let e = enricher(
        vec![google.clone() as DynProvider],
        StubContent::broken(),
        clock,
    );

    let err = e
        .enrich(&EnrichmentRequest::new(URL, ProviderMode::Google))
        .await
        .expect_err("content failure must surface");

    assert!(matches!(err, EnrichError::Content(_)));
    assert_eq!(google.calls(), 0);
}

#[tokio::test]
async fn cache_is_keyed_by_canonical_url() {
    let clock = manual_clock();
    let google = StubProvider::ok(ProviderId::Google);
    let e = enricher(
        vec![google.clone() as DynProvider],
        StubContent::text("content"),
        clock,
    );

    e.enrich(&EnrichmentRequest::new("example.com", ProviderMode::Google))
        .await
        .expect("bare host");
    let hit = e
        .enrich(&EnrichmentRequest::new("https://EXAMPLE.com/#top", ProviderMode::Google))
        .await
        .expect("same canonical url");

    assert!(hit.cache_hit);
    assert_eq!(google.calls(), 1);
}
