//! Prompt shared by every provider.

use crate::site::company_name;

pub const MAX_CONTENT_CHARS: usize = 12_000;

pub const SYSTEM_PROMPT: &str = "You are a meticulous B2B research analyst. \
Answer with a single JSON object and nothing else.";

const SCHEMA: &str = r#"{
  "summary": "2-3 sentence overview of the company",
  "whatTheyDo": ["up to 20 short statements describing products, services, customers"],
  "keywords": ["up to 20 keywords (industry, technology, market)"],
  "signals": ["up to 20 notable business signals: hiring, funding, launches, partnerships"],
  "companyDetails": {
    "founded": "year or date, if stated",
    "employees": "employee count or range, if stated",
    "netWorth": "valuation or net worth, if stated",
    "founders": ["founder names, if stated"],
    "headquarters": "city and country, if stated",
    "revenue": "revenue figure, if stated",
    "funding": "funding stage or total raised, if stated"
  },
  "sources": [{"url": "page the facts came from", "timestamp": "ISO-8601 time"}]
}"#;

/// First `max` characters of `s`, cut on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn build_prompt(content: &str, url: &str) -> String {
    let company = company_name(url);
    let excerpt = truncate_chars(content, MAX_CONTENT_CHARS);
    format!(
        "Analyze the company website below and return business intelligence as JSON \
matching this schema exactly:\n{SCHEMA}\n\n\
Rules: only use facts supported by the content; omit companyDetails fields that are not stated; \
keep list items short.\n\n\
Company: {company}\nURL: {url}\n\nWebsite content:\n\"\"\"\n{excerpt}\n\"\"\""
    )
}
