//! Language model clients
//!
//! Every backend implements [`LanguageModel`]: one system instruction plus
//! one user message in, one [`ModelReply`] out. Adapters decide which reply
//! variant they produce, so callers never inspect response shapes.

pub mod gemini;
pub mod gemini_types;
pub mod huggingface;

pub use gemini::GeminiClient;
pub use huggingface::HuggingFaceClient;

use crate::config::{LlmConfig, ModelProvider};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failures of an upstream model call
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key configured for the selected provider
    #[error("API key is empty")]
    MissingApiKey,

    /// The HTTP request could not be sent or its body not read
    #[error("Request to model API failed: {0}")]
    Request(String),

    /// Upstream quota exhausted (HTTP 429)
    #[error("Model API rate limit exceeded: {0}")]
    RateLimited(String),

    /// Upstream returned a non-success status
    #[error("Model API returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// The provider refused the prompt
    #[error("Model API blocked the prompt: {0}")]
    Blocked(String),

    /// Body could not be parsed into the provider's response type
    #[error("Failed to parse model API response: {0}")]
    InvalidResponse(String),

    /// Embedding response held no values
    #[error("Model API response contains no embedding values")]
    EmptyResponse,
}

/// A model reply, tagged by the shape the adapter received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Structured chat message with a content field
    Message {
        /// Text content of the message
        content: String,
    },
    /// Raw generated text
    Text(String),
}

impl ModelReply {
    /// Extract the reply text
    pub fn into_text(self) -> String {
        match self {
            ModelReply::Message { content } => content,
            ModelReply::Text(text) => text,
        }
    }
}

impl From<String> for ModelReply {
    fn from(text: String) -> Self {
        ModelReply::Text(text)
    }
}

/// A generative model behind a uniform "complete this prompt" call
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Run one system + human exchange
    async fn complete(&self, system: &str, user: &str) -> Result<ModelReply, LlmError>;
}

/// Build the configured model client
///
/// The HTTP client is shared so all upstream calls reuse one connection pool.
pub fn build_language_model(config: &LlmConfig, http: reqwest::Client) -> Arc<dyn LanguageModel> {
    match config.provider {
        ModelProvider::Gemini => Arc::new(GeminiClient::new(http, config)),
        ModelProvider::HuggingFace => Arc::new(HuggingFaceClient::new(http, config)),
    }
}
