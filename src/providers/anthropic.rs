//! Anthropic Messages API.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{usable_text, Attempt, Backend, HttpProvider};
use crate::types::ProviderId;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

pub struct Anthropic;

pub type AnthropicClient = HttpProvider<Anthropic>;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: [TextBlock<'a>; 1],
}

#[derive(Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<Value>,
}

impl Backend for Anthropic {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn request(&self, http: &Client, attempt: &Attempt<'_>, prompt: &str) -> RequestBuilder {
        http.post(format!("{}/v1/messages", attempt.base_url))
            .header("x-api-key", attempt.key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&MessagesRequest {
                model: attempt.model,
                max_tokens: MAX_TOKENS,
                messages: [Message {
                    role: "user",
                    content: [TextBlock {
                        kind: "text",
                        text: prompt,
                    }],
                }],
            })
    }

    /// First `text`-typed content block.
    fn response_text(&self, body: &[u8]) -> Option<String> {
        let resp: MessagesResponse = serde_json::from_slice(body).ok()?;
        let block = resp
            .content?
            .into_iter()
            .find(|b| b.kind.as_deref() == Some("text"))?;
        usable_text(block.text.as_ref())
    }
}
