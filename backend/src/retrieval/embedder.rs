//! Query/document embedders

use crate::config::{LlmConfig, RetrievalConfig};
use crate::llm::gemini::embed_content;
use crate::retrieval::RetrievalError;
use async_trait::async_trait;

/// Turns text into an embedding vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding model identifier (recorded in the index file)
    fn model(&self) -> &str;

    /// Embed one piece of text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Gemini `embedContent` embedder
pub struct GeminiEmbedder {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiEmbedder {
    /// Create an embedder sharing the model client's key and base URL
    pub fn new(http: reqwest::Client, llm: &LlmConfig, retrieval: &RetrievalConfig) -> Self {
        Self {
            http,
            api_key: llm.gemini_api_key.clone(),
            base_url: llm.gemini_api_base_url.clone(),
            model: retrieval.embedding_model.clone(),
        }
    }

    /// Point the embedder at another base URL (mock servers in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        tracing::debug!(model = %self.model, text_len = text.len(), "Embedding text");
        let values = embed_content(&self.http, &self.base_url, &self.api_key, &self.model, text)
            .await?;
        Ok(values)
    }
}
