//! Placeholder result used when every provider failed. Never cached.

use chrono::{DateTime, Utc};

use crate::site::{company_name, display_host};
use crate::types::{Analysis, CompanyDetails, ProviderId, SourceRef};

pub const FALLBACK_ERROR: &str = "AI enrichment unavailable; showing placeholder data";

const NOT_SPECIFIED: &str = "Not specified";
const NOT_DISCLOSED: &str = "Not disclosed";

pub fn fallback_analysis(url: &str, now: DateTime<Utc>) -> Analysis {
    let name = company_name(url);
    let host = display_host(url);

    Analysis {
        summary: format!(
            "{name} operates the website {host}. Automated analysis is temporarily unavailable, \
             so this profile contains placeholder information only."
        ),
        what_they_do: vec![
            "Business details could not be analyzed automatically".to_string(),
            "Visit the company website for more information".to_string(),
        ],
        keywords: vec![
            "company".to_string(),
            "business".to_string(),
            "website".to_string(),
        ],
        signals: vec!["Enrichment pending: retry later for AI analysis".to_string()],
        company_details: Some(CompanyDetails {
            founded: Some(NOT_SPECIFIED.to_string()),
            employees: Some(NOT_SPECIFIED.to_string()),
            net_worth: Some(NOT_DISCLOSED.to_string()),
            founders: Some(vec![NOT_SPECIFIED.to_string()]),
            headquarters: Some(NOT_SPECIFIED.to_string()),
            revenue: Some(NOT_DISCLOSED.to_string()),
            funding: Some(NOT_DISCLOSED.to_string()),
        }),
        sources: vec![SourceRef::synthetic(url, now)],
        provider: ProviderId::Fallback,
        error: Some(FALLBACK_ERROR.to_string()),
    }
}
