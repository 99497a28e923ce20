// src/config/mod.rs
//! Environment-sourced configuration.
//!
//! `EnrichConfig::from_env()` reads the process environment;
//! `EnrichConfig::from_lookup()` takes any lookup function so tests never
//! have to mutate global state.

pub mod credentials;

use std::time::Duration;

pub use credentials::{CredentialPool, ModelList};

use crate::cache::DEFAULT_TTL;
use crate::retry::RetryPolicy;
use crate::types::{LiveProvider, ProviderMode};

// --- env names ---
pub const ENV_PROVIDER_MODE: &str = "ENRICH_PROVIDER";
pub const ENV_CACHE_TTL_MS: &str = "ENRICH_CACHE_TTL_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ENRICH_HTTP_TIMEOUT_SECS";
pub const ENV_SCRAPER_FALLBACK_KEY: &str = "SCRAPER_FALLBACK_API_KEY";
pub const ENV_SCRAPER_FALLBACK_URL: &str = "SCRAPER_FALLBACK_URL";

// --- defaults ---
pub const DEFAULT_GEMINI_MODELS: [&str; 4] = [
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
];
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_SCRAPER_FALLBACK_URL: &str = "https://r.jina.ai/";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Env variable names for one provider.
struct ProviderEnv {
    primary_key: &'static str,
    secondary_key: &'static str,
    key_list: &'static str,
    base_url: &'static str,
    default_base_url: &'static str,
}

const GOOGLE_ENV: ProviderEnv = ProviderEnv {
    primary_key: "GEMINI_API_KEY",
    secondary_key: "GOOGLE_API_KEY",
    key_list: "GEMINI_API_KEYS",
    base_url: "GEMINI_API_BASE_URL",
    default_base_url: "https://generativelanguage.googleapis.com",
};

const OPENAI_ENV: ProviderEnv = ProviderEnv {
    primary_key: "OPENAI_API_KEY",
    secondary_key: "OPENAI_API_KEY_SECONDARY",
    key_list: "OPENAI_API_KEYS",
    base_url: "OPENAI_API_BASE_URL",
    default_base_url: "https://api.openai.com",
};

const ANTHROPIC_ENV: ProviderEnv = ProviderEnv {
    primary_key: "ANTHROPIC_API_KEY",
    secondary_key: "ANTHROPIC_API_KEY_SECONDARY",
    key_list: "ANTHROPIC_API_KEYS",
    base_url: "ANTHROPIC_API_BASE_URL",
    default_base_url: "https://api.anthropic.com",
};

fn provider_env(id: LiveProvider) -> &'static ProviderEnv {
    match id {
        LiveProvider::Google => &GOOGLE_ENV,
        LiveProvider::OpenAi => &OPENAI_ENV,
        LiveProvider::Anthropic => &ANTHROPIC_ENV,
    }
}

/// Everything one provider client needs.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub id: LiveProvider,
    /// Reported when the pool is empty.
    pub primary_key_var: &'static str,
    pub keys: CredentialPool,
    pub models: ModelList,
    pub base_url: String,
}

impl ProviderSettings {
    /// Settings with the vendor's default base URL and model(s). Handy for tests.
    pub fn new(id: LiveProvider, keys: CredentialPool) -> Self {
        let env = provider_env(id);
        let models = match id {
            LiveProvider::Google => ModelList::assemble(&[], None, &DEFAULT_GEMINI_MODELS),
            LiveProvider::OpenAi => ModelList::single(DEFAULT_OPENAI_MODEL),
            LiveProvider::Anthropic => ModelList::single(DEFAULT_ANTHROPIC_MODEL),
        };
        Self {
            id,
            primary_key_var: env.primary_key,
            keys,
            models,
            base_url: env.default_base_url.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, models: ModelList) -> Self {
        self.models = models;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub fallback_api_key: Option<String>,
    pub fallback_url: String,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            fallback_api_key: None,
            fallback_url: DEFAULT_SCRAPER_FALLBACK_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub google: ProviderSettings,
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub default_mode: ProviderMode,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub retry: RetryPolicy,
    pub scraper: ScraperSettings,
}

impl EnrichConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let google_models = ModelList::assemble(
            &[
                get("GEMINI_MODEL").as_deref(),
                get("GOOGLE_GEMINI_MODEL").as_deref(),
            ],
            get("GEMINI_MODELS").as_deref(),
            &DEFAULT_GEMINI_MODELS,
        );
        let openai_model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let anthropic_model =
            get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string());

        let google = provider_from(LiveProvider::Google, &get).with_models(google_models);
        let openai = provider_from(LiveProvider::OpenAi, &get)
            .with_models(ModelList::single(&openai_model));
        let anthropic = provider_from(LiveProvider::Anthropic, &get)
            .with_models(ModelList::single(&anthropic_model));

        let default_mode = get(ENV_PROVIDER_MODE)
            .as_deref()
            .and_then(ProviderMode::parse)
            .unwrap_or(ProviderMode::Google);

        let cache_ttl = get(ENV_CACHE_TTL_MS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TTL);

        let http_timeout = get(ENV_HTTP_TIMEOUT_SECS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        let scraper = ScraperSettings {
            fallback_api_key: get(ENV_SCRAPER_FALLBACK_KEY),
            fallback_url: get(ENV_SCRAPER_FALLBACK_URL)
                .unwrap_or_else(|| DEFAULT_SCRAPER_FALLBACK_URL.to_string()),
        };

        Self {
            google,
            openai,
            anthropic,
            default_mode,
            cache_ttl,
            http_timeout,
            retry: RetryPolicy::default(),
            scraper,
        }
    }
}

fn provider_from<G>(id: LiveProvider, get: &G) -> ProviderSettings
where
    G: Fn(&str) -> Option<String>,
{
    let env = provider_env(id);
    let keys = CredentialPool::assemble(
        get(env.primary_key).as_deref(),
        get(env.secondary_key).as_deref(),
        get(env.key_list).as_deref(),
    );
    let settings = ProviderSettings::new(id, keys);
    match get(env.base_url) {
        Some(url) => settings.with_base_url(url),
        None => settings,
    }
}
