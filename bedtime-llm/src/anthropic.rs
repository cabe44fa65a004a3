//! Anthropic Messages API wire types.

use crate::{Completion, Error};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

pub(crate) const API_BASE: &str = "https://api.anthropic.com/v1";
pub(crate) const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";

pub(crate) fn endpoint(base_url: &str) -> String {
    format!("{}/messages", base_url.trim_end_matches('/'))
}

pub(crate) fn headers(api_key: &str) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        "x-api-key",
        HeaderValue::from_str(api_key)
            .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
    );
    headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: [ApiMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

impl<'a> ApiRequest<'a> {
    pub(crate) fn new(model: &'a str, completion: &'a Completion) -> Self {
        Self {
            model,
            max_tokens: completion.max_tokens,
            messages: [ApiMessage {
                role: "user",
                content: &completion.prompt,
            }],
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
    content: Vec<ApiContent>,
}

impl ApiResponse {
    /// All text blocks concatenated; `None` when there were none.
    pub(crate) fn into_text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiContent::Text { text } => Some(text),
                ApiContent::Other => None,
            })
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        let headers = headers("test-key").unwrap();
        assert_eq!(headers["x-api-key"], "test-key");
        assert_eq!(headers["anthropic-version"], API_VERSION);
    }

    #[test]
    fn test_invalid_api_key_header() {
        assert!(matches!(headers("bad\nkey"), Err(Error::Config(_))));
    }

    #[test]
    fn test_request_shape() {
        let completion = Completion::new("Write a story").with_max_tokens(1200);
        let body = serde_json::to_value(ApiRequest::new(DEFAULT_MODEL, &completion)).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert!(body.get("system").is_none());
        assert_eq!(body["max_tokens"], 1200);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Write a story");
    }

    #[test]
    fn test_response_joins_text_blocks() {
        let raw = r#"{
            "id": "msg_1",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Once upon "},
                {"type": "text", "text": "a time."}
            ],
            "stop_reason": "end_turn"
        }"#;
        let response: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Once upon a time."));
    }

    #[test]
    fn test_response_without_text() {
        let response: ApiResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(response.into_text().is_none());
    }
}
