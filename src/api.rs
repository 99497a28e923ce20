use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::clock::iso;
use crate::enrich::Enricher;
use crate::error::EnrichError;
use crate::types::{EnrichmentRequest, ProviderMode};

pub const HEADER_CACHE: &str = "x-enrich-cache";
pub const HEADER_PROVIDER: &str = "x-enrich-provider";

#[derive(Clone)]
pub struct AppState {
    pub enricher: Arc<Enricher>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(enricher: Enricher) -> Self {
        Self {
            enricher: Arc::new(enricher),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/enrich", post(enrich).fallback(method_not_allowed))
        .merge(crate::metrics::router(state.metrics.clone()))
        .layer(CorsLayer::very_permissive())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// `forceRefresh` and `provider` are loosely typed: a wrong type falls back
/// to the default instead of rejecting the request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrichBody {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    force_refresh: Option<Value>,
    #[serde(default)]
    provider: Option<Value>,
}

async fn enrich(
    State(state): State<AppState>,
    body: Result<Json<EnrichBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(b)) => b,
        Err(rej) => {
            return error_json(
                StatusCode::BAD_REQUEST,
                format!("invalid request body: {}", rej.body_text()),
            )
        }
    };

    let Some(url) = body.url.filter(|u| !u.trim().is_empty()) else {
        return error_json(StatusCode::BAD_REQUEST, "url is required".to_string());
    };

    let provider = body.provider.as_ref().and_then(Value::as_str);
    let force_refresh = body
        .force_refresh
        .as_ref()
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mode = ProviderMode::resolve(provider, state.enricher.default_mode());
    let req = EnrichmentRequest::new(url, mode).force_refresh(force_refresh);

    match state.enricher.enrich(&req).await {
        Ok(out) => {
            let cache = if out.cache_hit { "HIT" } else { "MISS" };
            let provider = out.result.analysis.provider.as_str();
            let mut resp = Json(out.result).into_response();
            let headers = resp.headers_mut();
            headers.insert(HEADER_CACHE, HeaderValue::from_static(cache));
            headers.insert(HEADER_PROVIDER, HeaderValue::from_static(provider));
            resp
        }
        Err(EnrichError::Validation(e)) => error_json(StatusCode::BAD_REQUEST, e.to_string()),
        Err(EnrichError::Content(e)) => {
            error!(url = %req.url, error = %e, "content acquisition failed");
            internal_error(e.to_string())
        }
    }
}

async fn method_not_allowed() -> Response {
    error_json(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
}

fn error_json(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "enrichedAt": iso(Utc::now()) })),
    )
        .into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "handler panicked");
    internal_error(format!("Internal server error: {detail}"))
}
