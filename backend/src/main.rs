//! AwareMe Backend
//!
//! REST API for child-safety education, parent guidance and emergency
//! alerts.

use awareme_backend::{
    api::{self, ApiState},
    auth::CredentialService,
    config::Config,
    db::Db,
    llm::build_language_model,
    pipeline::ChatPipeline,
    retrieval::{GeminiEmbedder, RetrievalIndex},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);
    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    // One HTTP client for every upstream call
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.llm.timeout_secs))
        .build()?;

    let model = build_language_model(&config.llm, http.clone());
    info!(provider = %model.name(), "Language model client ready");

    let embedder = Arc::new(GeminiEmbedder::new(http, &config.llm, &config.retrieval));
    let retrieval = RetrievalIndex::load_optional(&config.retrieval.index_path, embedder).map(Arc::new);
    let pipeline = ChatPipeline::new(model, retrieval, config.retrieval.top_k);
    if !pipeline.has_retrieval() {
        warn!("Parent chat will answer without retrieved context");
    }

    let db = Db::new(&config.persistence.database_path).await?;

    let state = ApiState {
        db: Arc::new(db),
        pipeline: Arc::new(pipeline),
        credentials: Arc::new(CredentialService::new(&config.auth)),
    };
    let app = api::router(state, &config.server.cors_origins);

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
