//! Chat-completion backend
//!
//! The report generator talks to a hosted, OpenAI-compatible chat endpoint.
//! The operator supplies the API key per request, so the key is an argument
//! of every call rather than client state.
//!
//! `ChatCompletion` is the seam: production uses [`OpenAiClient`], tests plug
//! in a canned or local mock implementation.

use async_trait::async_trait;

mod openai;

pub use openai::{ChatMessage, ChatRequest, OpenAiClient};

/// Chat-completion errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed chat response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("chat response contained no message content")]
    EmptyContent,
}

/// Unified trait for chat-completion backends
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text.
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, ApiError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
