//! # Result normalizer
//! Coerce an untyped model payload into an [`Analysis`]. Never fails:
//! anything with the wrong shape is dropped or replaced by a default.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clock::iso;
use crate::extract::JsonObject;
use crate::types::{Analysis, CompanyDetails, ProviderId, SourceRef, MAX_LIST_ITEMS};

pub const NO_SUMMARY: &str = "No summary available";

pub fn normalize(
    parsed: &JsonObject,
    url: &str,
    provider: ProviderId,
    now: DateTime<Utc>,
) -> Analysis {
    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or(NO_SUMMARY)
        .to_string();

    let mut sources = sanitize_sources(parsed.get("sources"), now);
    if sources.is_empty() {
        sources.push(SourceRef::synthetic(url, now));
    }

    Analysis {
        summary,
        what_they_do: string_list(parsed.get("whatTheyDo")),
        keywords: string_list(parsed.get("keywords")),
        signals: string_list(parsed.get("signals")),
        company_details: parsed
            .get("companyDetails")
            .and_then(Value::as_object)
            .map(company_details),
        sources,
        provider,
        error: None,
    }
}

/// Strings only, trimmed, non-empty, first [`MAX_LIST_ITEMS`] in original order.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_LIST_ITEMS)
        .map(str::to_string)
        .collect()
}

fn company_details(obj: &JsonObject) -> CompanyDetails {
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    CompanyDetails {
        founded: text("founded"),
        employees: text("employees"),
        net_worth: text("netWorth"),
        founders: obj
            .get("founders")
            .filter(|v| v.is_array())
            .map(|v| string_list(Some(v))),
        headquarters: text("headquarters"),
        revenue: text("revenue"),
        funding: text("funding"),
    }
}

fn sanitize_sources(value: Option<&Value>, now: DateTime<Utc>) -> Vec<SourceRef> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|o| {
            let url = o.get("url").and_then(Value::as_str)?;
            let timestamp = o
                .get("timestamp")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| iso(now));
            Some(SourceRef {
                url: url.to_string(),
                timestamp,
            })
        })
        .collect()
}
