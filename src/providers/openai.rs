//! OpenAI Chat Completions in JSON mode.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::prompt::SYSTEM_PROMPT;
use super::{usable_text, Attempt, Backend, HttpProvider};
use crate::types::ProviderId;

pub struct OpenAi;

pub type OpenAiClient = HttpProvider<OpenAi>;

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: [Msg<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMsg>,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<Value>,
}

impl Backend for OpenAi {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn request(&self, http: &Client, attempt: &Attempt<'_>, prompt: &str) -> RequestBuilder {
        http.post(format!("{}/v1/chat/completions", attempt.base_url))
            .bearer_auth(attempt.key)
            .json(&Req {
                model: attempt.model,
                messages: [
                    Msg {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                response_format: ResponseFormat {
                    kind: "json_object",
                },
                temperature: 0.2,
            })
    }

    /// `choices[0].message.content`
    fn response_text(&self, body: &[u8]) -> Option<String> {
        let resp: Resp = serde_json::from_slice(body).ok()?;
        let msg = resp.choices?.into_iter().next()?.message?;
        usable_text(msg.content.as_ref())
    }
}
