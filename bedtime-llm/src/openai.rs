//! OpenAI-compatible chat completions wire types.

use crate::Completion;
use serde::{Deserialize, Serialize};

pub(crate) const API_BASE: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub(crate) fn endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 1],
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

impl<'a> ApiRequest<'a> {
    pub(crate) fn new(model: &'a str, completion: &'a Completion) -> Self {
        Self {
            model,
            messages: [ApiMessage {
                role: "user",
                content: &completion.prompt,
            }],
            max_tokens: completion.max_tokens,
            temperature: completion.temperature,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

impl ApiResponse {
    /// Text of the first choice, if any.
    pub(crate) fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
