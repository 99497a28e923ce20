//! # Enrichment data model
//! Wire shapes shared by the providers, the cache and the HTTP layer.
//! Field names serialize in camelCase to match what UI consumers expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::iso;

/// Maximum number of entries kept in any list field.
pub const MAX_LIST_ITEMS: usize = 20;

/// Who produced an analysis. `Fallback` is the synthetic placeholder source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Google,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Fallback,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Google => "google",
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Fallback => "fallback",
        }
    }

    /// Human-facing vendor label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::Google => "Gemini",
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Anthropic => "Anthropic",
            ProviderId::Fallback => "Fallback",
        }
    }

    pub fn is_live(&self) -> bool {
        *self != ProviderId::Fallback
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vendor that can actually be called. Configuration is only ever built
/// for these; [`ProviderId::Fallback`] has no settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiveProvider {
    Google,
    OpenAi,
    Anthropic,
}

/// Policy selecting which providers to try, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    #[default]
    Google,
    OpenAi,
    Anthropic,
    Auto,
}

impl ProviderMode {
    /// Case-insensitive parse; `gemini` is an alias for `google`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Some(ProviderMode::Google),
            "openai" => Some(ProviderMode::OpenAi),
            "anthropic" => Some(ProviderMode::Anthropic),
            "auto" => Some(ProviderMode::Auto),
            _ => None,
        }
    }

    /// Request value first, then the configured default; unrecognized values fall through.
    pub fn resolve(requested: Option<&str>, default_mode: ProviderMode) -> Self {
        requested.and_then(Self::parse).unwrap_or(default_mode)
    }

    /// Providers to attempt, in order.
    pub fn order(&self) -> &'static [ProviderId] {
        match self {
            ProviderMode::Google => &[ProviderId::Google],
            ProviderMode::OpenAi => &[ProviderId::OpenAi],
            ProviderMode::Anthropic => &[ProviderId::Anthropic],
            ProviderMode::Auto => &[ProviderId::Google, ProviderId::OpenAi, ProviderId::Anthropic],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_worth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founders: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub url: String,
    pub timestamp: String,
}

impl SourceRef {
    pub fn synthetic(url: &str, now: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            timestamp: iso(now),
        }
    }
}

/// An enrichment result before it is stamped with `enrichedAt`.
/// This is what providers return and what the cache stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub summary: String,
    pub what_they_do: Vec<String>,
    pub keywords: Vec<String>,
    pub signals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_details: Option<CompanyDetails>,
    pub sources: Vec<SourceRef>,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Analysis {
    /// Attach the freshness timestamp. Content is left untouched.
    pub fn stamp(self, at: DateTime<Utc>) -> EnrichmentResult {
        EnrichmentResult {
            analysis: self,
            enriched_at: iso(at),
        }
    }
}

/// The canonical response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub enriched_at: String,
}

/// One enrichment call. `url` is raw user input; the orchestrator canonicalizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub url: String,
    pub force_refresh: bool,
    pub mode: ProviderMode,
}

impl EnrichmentRequest {
    pub fn new(url: impl Into<String>, mode: ProviderMode) -> Self {
        Self {
            url: url.into(),
            force_refresh: false,
            mode,
        }
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }
}
