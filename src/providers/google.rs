//! Gemini `generateContent`. The only backend with more than one model per key.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{usable_text, Attempt, Backend, HttpProvider};
use crate::types::ProviderId;

pub struct Gemini;

pub type GoogleClient = HttpProvider<Gemini>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<Value>,
}

impl Backend for Gemini {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn request(&self, http: &Client, attempt: &Attempt<'_>, prompt: &str) -> RequestBuilder {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            attempt.base_url, attempt.model
        );
        http.post(url)
            .header("x-goog-api-key", attempt.key)
            .json(&GenerateRequest {
                contents: [Content {
                    role: "user",
                    parts: [Part { text: prompt }],
                }],
                generation_config: GenerationConfig {
                    response_mime_type: "application/json",
                    temperature: 0.2,
                },
            })
    }

    /// `candidates[0].content.parts[0].text`
    fn response_text(&self, body: &[u8]) -> Option<String> {
        let resp: GenerateResponse = serde_json::from_slice(body).ok()?;
        let part = resp
            .candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?;
        usable_text(part.text.as_ref())
    }
}
