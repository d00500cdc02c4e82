//! Retrieval index (RAG)
//!
//! Similarity search over safety-related reference documents. The index is
//! built offline by the `build_index` binary and loaded once at startup;
//! if loading fails the server runs without it.

pub mod builder;
pub mod chunker;
pub mod embedder;
pub mod index;

pub use embedder::{Embedder, GeminiEmbedder};
pub use index::{IndexEntry, IndexFile, VectorIndex};

use crate::llm::LlmError;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Retrieval failures
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The index file could not be read or parsed
    #[error("Failed to load retrieval index: {0}")]
    Load(String),

    /// The index file could not be written
    #[error("Failed to write retrieval index: {0}")]
    Write(String),

    /// Query or entry vector length differs from the index dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the index
        expected: usize,
        /// Dimension that was supplied
        actual: usize,
    },

    /// The embedding call failed
    #[error("Embedding request failed: {0}")]
    Embedding(#[from] LlmError),
}

/// A document returned by a query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    /// Document body
    pub text: String,
    /// Source identifier
    pub source: String,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Vector index plus the embedder that turns queries into vectors
pub struct RetrievalIndex {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
}

impl RetrievalIndex {
    /// Pair an index with a query embedder
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Load the index at `path`, or `None` when it is missing or unreadable
    pub fn load_optional(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Option<Self> {
        let path = path.as_ref();
        match VectorIndex::load(path) {
            Ok(index) => {
                info!(
                    path = %path.display(),
                    entries = index.len(),
                    dimension = index.dimension(),
                    model = %index.model(),
                    "Loaded retrieval index"
                );
                if index.model() != embedder.model() {
                    warn!(
                        index_model = %index.model(),
                        query_model = %embedder.model(),
                        "Retrieval index was built with a different embedding model"
                    );
                }
                Some(Self::new(index, embedder))
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Retrieval index unavailable, parent chat runs without context"
                );
                None
            }
        }
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Top `k` documents most similar to `text`, best first
    pub async fn query(
        &self,
        text: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        let mut embedding = self.embedder.embed(text).await?;
        index::normalize(&mut embedding);
        self.index.search(&embedding, k)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    fn keyword_embedder() -> Arc<dyn Embedder> {
        Arc::new(KeywordEmbedder {
            keywords: vec!["touch", "secret", "adult"],
        })
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let retrieval = keyword_index(keyword_embedder());
        let docs = retrieval.query("How do I explain touch?", 3).await.unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].source, "touch.md");
        assert_eq!(docs[1].source, "touch-secret.md");
    }

    #[tokio::test]
    async fn test_query_propagates_embedding_failure() {
        let retrieval = keyword_index(Arc::new(FailingEmbedder));
        let result = retrieval.query("anything", 3).await;
        assert!(matches!(result, Err(RetrievalError::Embedding(_))));
    }

    #[test]
    fn test_load_optional_missing_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.json");
        assert!(RetrievalIndex::load_optional(&missing, keyword_embedder()).is_none());
    }

    #[test]
    fn test_load_optional_reads_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.json");
        let index = VectorIndex::new(
            "keyword",
            vec![IndexEntry {
                source: "a".to_string(),
                text: "b".to_string(),
                embedding: vec![1.0, 0.0, 0.0],
            }],
        )
        .unwrap();
        std::fs::write(&path, serde_json::to_string(&index.to_file()).unwrap()).unwrap();

        let loaded = RetrievalIndex::load_optional(&path, keyword_embedder()).unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
