//! # JSON extractor
//! Recover a JSON object from free-form model output.
//!
//! Strategies, first success wins:
//! 1. the whole trimmed text
//! 2. each fenced ```` ``` ```` block (optionally tagged `json`), in order
//! 3. each balanced `{...}` span, ordered by its opening brace, ignoring
//!    braces inside string literals (one linear pass over the text)

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ExtractError;

pub type JsonObject = Map<String, Value>;

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[jJ][sS][oO][nN])?(.*?)```").expect("fence regex"));

pub fn extract_json_object(text: &str) -> Result<JsonObject, ExtractError> {
    if let Some(obj) = parse_object(text) {
        return Ok(obj);
    }

    for caps in RE_FENCE.captures_iter(text) {
        if let Some(obj) = caps.get(1).and_then(|m| parse_object(m.as_str())) {
            return Ok(obj);
        }
    }

    for (start, end) in balanced_spans(text.as_bytes()) {
        if let Some(obj) = parse_object(&text[start..=end]) {
            return Ok(obj);
        }
    }

    Err(ExtractError)
}

/// Direct parse; arrays and scalars are rejected.
fn parse_object(candidate: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Every balanced `{...}` span as `(open, close)`, ordered by opening brace.
///
/// Single pass with a stack of open braces. Quotes only open string
/// literals while at least one brace is open, so prose around the object
/// cannot flip the string state.
fn balanced_spans(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut open = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, i));
                }
            }
            _ => {}
        }
    }
    spans.sort_unstable();
    spans
}
