//! In-memory vector index
//!
//! The index is a JSON file of text chunks with precomputed, L2-normalized
//! embeddings. Search is an exhaustive cosine-similarity scan, which is
//! plenty for the few hundred chunks the builder produces.

use crate::retrieval::{RetrievalError, RetrievedDocument};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Current on-disk format version
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// One indexed chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Where the chunk came from (file name or URL)
    pub source: String,
    /// Chunk text
    pub text: String,
    /// Unit-length embedding
    pub embedding: Vec<f32>,
}

/// Serialized index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    /// Format version
    pub version: u32,
    /// Embedding model the vectors were produced with
    pub model: String,
    /// Vector dimension shared by all entries
    pub dimension: usize,
    /// Indexed chunks
    pub entries: Vec<IndexEntry>,
}

/// Scale a vector to unit length; zero vectors are left untouched
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Cosine similarity of two equal-length vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Read-only similarity index
#[derive(Debug, Clone)]
pub struct VectorIndex {
    model: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from entries, checking that dimensions agree
    pub fn new(model: impl Into<String>, entries: Vec<IndexEntry>) -> Result<Self, RetrievalError> {
        let dimension = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimension,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self {
            model: model.into(),
            dimension,
            entries,
        })
    }

    /// Load an index file written by the `build_index` tool
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RetrievalError::Load(format!("{}: {}", path.display(), e)))?;
        let file: IndexFile = serde_json::from_str(&raw)
            .map_err(|e| RetrievalError::Load(format!("{}: {}", path.display(), e)))?;

        if file.version != INDEX_FORMAT_VERSION {
            return Err(RetrievalError::Load(format!(
                "unsupported index version {} (expected {})",
                file.version, INDEX_FORMAT_VERSION
            )));
        }
        if file.entries.is_empty() {
            return Err(RetrievalError::Load(format!(
                "{}: index has no entries",
                path.display()
            )));
        }

        let index = Self::new(file.model, file.entries)?;
        if index.dimension != file.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: file.dimension,
                actual: index.dimension,
            });
        }
        Ok(index)
    }

    /// Serialize into the on-disk format
    pub fn to_file(&self) -> IndexFile {
        IndexFile {
            version: INDEX_FORMAT_VERSION,
            model: self.model.clone(),
            dimension: self.dimension,
            entries: self.entries.clone(),
        }
    }

    /// Embedding model the index was built with
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` chunks by descending cosine similarity to `query`
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        if query.len() != self.dimension {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.embedding), entry))
            .collect();

        // Stable sort keeps file order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| RetrievedDocument {
                text: entry.text.clone(),
                source: entry.source.clone(),
                score,
            })
            .collect())
    }
}
