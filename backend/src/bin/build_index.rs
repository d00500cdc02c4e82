//! Builds the retrieval index used by the parent chat
//!
//! Usage: `build_index [SOURCE_DIR] [OUTPUT_PATH]`
//!
//! SOURCE_DIR defaults to `docs`, OUTPUT_PATH to `RAG_INDEX_PATH`. Every
//! chunk is embedded with `EMBEDDING_MODEL` through the Gemini API, so
//! `GEMINI_API_KEY` must be set.

use anyhow::Context;
use awareme_backend::config::Config;
use awareme_backend::retrieval::builder::{build_index, read_documents, write_index};
use awareme_backend::retrieval::GeminiEmbedder;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const DEFAULT_SOURCE_DIR: &str = "docs";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let mut args = std::env::args().skip(1);
    let source_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_SOURCE_DIR.to_string()));
    let output = PathBuf::from(
        args.next()
            .unwrap_or_else(|| config.retrieval.index_path.clone()),
    );

    if config.llm.gemini_api_key.is_empty() {
        anyhow::bail!("GEMINI_API_KEY must be set to embed documents");
    }

    let documents = read_documents(&source_dir)
        .with_context(|| format!("Failed to read documents from {}", source_dir.display()))?;
    info!(
        source_dir = %source_dir.display(),
        documents = documents.len(),
        "Loaded source documents"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.llm.timeout_secs))
        .build()?;
    let embedder = GeminiEmbedder::new(http, &config.llm, &config.retrieval);

    let index = build_index(&documents, &embedder)
        .await
        .context("Failed to build retrieval index")?;
    if index.is_empty() {
        anyhow::bail!(
            "No indexable documents in {} (need .txt or .md files over 200 characters)",
            source_dir.display()
        );
    }

    write_index(&index, &output)
        .with_context(|| format!("Failed to write index to {}", output.display()))?;

    info!(
        output = %output.display(),
        entries = index.len(),
        dimension = index.dimension(),
        model = %index.model(),
        "Retrieval index written"
    );
    Ok(())
}
