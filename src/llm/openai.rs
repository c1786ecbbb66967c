//! OpenAI-compatible chat completion client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, ChatCompletion};
use crate::config::LlmConfig;

/// Response bodies are cut to this many characters in error messages.
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    pub fn user(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `choices[0].message.content` of a chat completion response body.
fn extract_content(body: &[u8]) -> Result<String, ApiError> {
    let response: ChatResponse = serde_json::from_slice(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(ApiError::EmptyContent)
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client from config. No timeout unless `timeout_secs` is set.
    pub fn new(config: &LlmConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, ApiError> {
        let start = Instant::now();
        let resp = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&ChatRequest::user(&self.model, prompt))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), endpoint = %self.endpoint, "Chat completion rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&body)),
            });
        }

        let text = extract_content(&body)?;
        tracing::info!(
            model = %self.model,
            chars = text.len(),
            latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Chat completion received"
        );
        Ok(text)
    }

    fn backend_name(&self) -> &'static str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest::user("gpt-4o", "hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn test_extract_first_choice() {
        let body = br##"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"# Report"}},{"index":1,"message":{"content":"other"}}]}"##;
        assert_eq!(extract_content(body).unwrap(), "# Report");
    }

    #[test]
    fn test_no_choices_is_empty_content() {
        assert!(matches!(
            extract_content(br#"{"choices":[]}"#),
            Err(ApiError::EmptyContent)
        ));
        assert!(matches!(
            extract_content(br#"{"choices":[{"message":{"content":null}}]}"#),
            Err(ApiError::EmptyContent)
        ));
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            extract_content(b"<html>bad gateway</html>"),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_truncate_long_bodies() {
        let long = "x".repeat(ERROR_BODY_LIMIT + 10);
        let cut = truncate(&long);
        assert_eq!(cut.len(), ERROR_BODY_LIMIT + 3);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_client_uses_config() {
        let config = LlmConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".into(),
            model: "test-model".into(),
            timeout_secs: Some(5),
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.model(), "test-model");
        assert_eq!(client.endpoint(), config.endpoint);
        assert_eq!(client.backend_name(), "openai-compatible");
    }
}
