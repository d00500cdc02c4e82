//! Offline index construction
//!
//! Reads reference documents from a directory, cleans and chunks them,
//! embeds every chunk and produces the [`VectorIndex`] the server loads.

use crate::retrieval::chunker::{
    clean_text, is_boilerplate, is_substantial, split_text, CHUNK_OVERLAP, CHUNK_SIZE,
};
use crate::retrieval::index::normalize;
use crate::retrieval::{Embedder, IndexEntry, RetrievalError, VectorIndex};
use std::path::Path;
use tracing::{debug, info};

/// File extensions picked up from the source directory
const SOURCE_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// A raw document before cleaning
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name the text came from
    pub source: String,
    /// Raw file contents
    pub text: String,
}

/// Read all `.txt` and `.md` files in `dir` (not recursive), sorted by name
pub fn read_documents(dir: &Path) -> Result<Vec<SourceDocument>, RetrievalError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| RetrievalError::Load(format!("{}: {}", dir.display(), e)))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| RetrievalError::Load(format!("{}: {}", dir.display(), e)))?
            .path();
        let wanted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !path.is_file() || !wanted {
            continue;
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| RetrievalError::Load(format!("{}: {}", path.display(), e)))?;
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        documents.push(SourceDocument { source, text });
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(documents)
}

/// Clean, filter and split documents into `(source, chunk)` pairs
pub fn prepare_chunks(documents: &[SourceDocument]) -> Vec<(String, String)> {
    let mut chunks = Vec::new();
    for document in documents {
        if is_boilerplate(&document.text) {
            debug!(source = %document.source, "Skipping boilerplate document");
            continue;
        }
        let cleaned = clean_text(&document.text);
        if !is_substantial(&cleaned) {
            debug!(source = %document.source, "Skipping short document");
            continue;
        }
        for chunk in split_text(&cleaned, CHUNK_SIZE, CHUNK_OVERLAP) {
            chunks.push((document.source.clone(), chunk));
        }
    }
    chunks
}

/// Embed every chunk and assemble the index
pub async fn build_index(
    documents: &[SourceDocument],
    embedder: &dyn Embedder,
) -> Result<VectorIndex, RetrievalError> {
    let chunks = prepare_chunks(documents);
    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        model = %embedder.model(),
        "Embedding chunks"
    );

    let mut entries = Vec::with_capacity(chunks.len());
    for (i, (source, text)) in chunks.into_iter().enumerate() {
        let mut embedding = embedder.embed(&text).await?;
        normalize(&mut embedding);
        debug!(chunk = i, source = %source, "Embedded chunk");
        entries.push(IndexEntry {
            source,
            text,
            embedding,
        });
    }

    VectorIndex::new(embedder.model(), entries)
}

/// Write an index as pretty JSON, creating parent directories
pub fn write_index(index: &VectorIndex, path: &Path) -> Result<(), RetrievalError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RetrievalError::Write(format!("{}: {}", parent.display(), e)))?;
        }
    }
    let json = serde_json::to_string_pretty(&index.to_file())
        .map_err(|e| RetrievalError::Write(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| RetrievalError::Write(format!("{}: {}", path.display(), e)))
}
