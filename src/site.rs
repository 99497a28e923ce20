//! URL canonicalization, host guard, and company-name derivation.

use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

use crate::error::ValidationError;

/// Normalize user input into the canonical URL used as the cache key.
///
/// Missing scheme defaults to `https://`. Fragments are dropped.
/// Loopback, unspecified and link-local hosts are rejected.
pub fn canonicalize(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingUrl);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url =
        Url::parse(&candidate).map_err(|e| ValidationError::InvalidUrl(format!("{trimmed}: {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    let host = url
        .host()
        .ok_or_else(|| ValidationError::InvalidUrl(format!("{trimmed}: missing host")))?;
    if is_disallowed_host(&host) {
        return Err(ValidationError::DisallowedHost(host.to_string()));
    }

    url.set_fragment(None);
    Ok(url.to_string())
}

/// Same host guard as [`canonicalize`], for URLs that did not come from the
/// user (redirect hops). A URL without a host is disallowed.
pub fn is_disallowed_url(url: &Url) -> bool {
    url.host().map_or(true, |h| is_disallowed_host(&h))
}

pub fn is_disallowed_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(d) => {
            let d = d.trim_end_matches('.');
            d == "localhost" || d.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_blocked_v4(ip),
        Host::Ipv6(ip) => is_blocked_v6(ip),
    }
}

fn is_blocked_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_link_local() || ip.is_unspecified()
}

fn is_blocked_v6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_v4(&v4);
    }
    // fe80::/10
    let link_local = (ip.segments()[0] & 0xffc0) == 0xfe80;
    ip.is_loopback() || ip.is_unspecified() || link_local
}

/// Host without a leading `www.`; falls back to the input if it does not parse.
pub fn display_host(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string());
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// `https://www.acme-corp.io/about` → `Acme Corp`.
pub fn company_name(url: &str) -> String {
    let host = display_host(url);
    let label = host.split('.').next().unwrap_or_default();
    let words: Vec<String> = label
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();
    if words.is_empty() {
        host
    } else {
        words.join(" ")
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
