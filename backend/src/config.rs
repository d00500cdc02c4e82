//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::str::FromStr;

/// Development fallback for the token signing secret
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Credential configuration
    pub auth: AuthConfig,
    /// Language model configuration
    pub llm: LlmConfig,
    /// Retrieval (RAG) configuration
    pub retrieval: RetrievalConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

/// Credential configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Session token lifetime in days
    pub token_ttl_days: i64,
}

// Keep the secret out of the startup log line.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl_days)
            .finish()
    }
}

/// Which model backend answers chat turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    /// Google Gemini `generateContent`
    Gemini,
    /// Hugging Face hosted inference
    HuggingFace,
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ModelProvider::Gemini),
            "huggingface" | "hf" => Ok(ModelProvider::HuggingFace),
            other => Err(format!("Unknown model provider: {}", other)),
        }
    }
}

/// Language model configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Selected backend
    pub provider: ModelProvider,
    /// Gemini API key
    pub gemini_api_key: String,
    /// Gemini model name
    pub gemini_model: String,
    /// Gemini API base URL
    pub gemini_api_base_url: String,
    /// Hugging Face API token
    pub huggingface_api_key: String,
    /// Hugging Face model repository id
    pub huggingface_repo: String,
    /// Hugging Face inference base URL
    pub huggingface_api_base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
    /// Outbound HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("gemini_model", &self.gemini_model)
            .field("huggingface_repo", &self.huggingface_repo)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Retrieval configuration
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Path to the prebuilt JSON vector index
    pub index_path: String,
    /// Number of documents fed into the parent prompt
    pub top_k: usize,
    /// Embedding model used for queries (must match the index)
    pub embedding_model: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env_or("PORT", 8000),
                host: env_string("HOST", "0.0.0.0"),
                cors_origins: env_string(
                    "CORS_ORIGINS",
                    "http://localhost:3000,http://localhost:5173",
                )
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            },
            persistence: PersistenceConfig {
                database_path: env_string("DATABASE_PATH", "app.db"),
            },
            auth: AuthConfig {
                jwt_secret: env_string("JWT_SECRET", DEFAULT_JWT_SECRET),
                token_ttl_days: env_or("TOKEN_TTL_DAYS", 7),
            },
            llm: LlmConfig {
                provider: env_or("MODEL_PROVIDER", ModelProvider::Gemini),
                gemini_api_key: env_string("GEMINI_API_KEY", ""),
                gemini_model: env_string("GEMINI_MODEL", "gemini-2.5-flash"),
                gemini_api_base_url: env_string(
                    "GEMINI_API_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta",
                ),
                huggingface_api_key: env_string("HUGGINGFACE_API_KEY", ""),
                huggingface_repo: env_string(
                    "HF_MODEL_REPO",
                    "mistralai/Mistral-7B-Instruct-v0.2",
                ),
                huggingface_api_base_url: env_string(
                    "HF_API_BASE_URL",
                    "https://api-inference.huggingface.co",
                ),
                temperature: env_or("LLM_TEMPERATURE", 0.7),
                max_output_tokens: env_or("LLM_MAX_TOKENS", 300),
                timeout_secs: env_or("LLM_TIMEOUT_SECS", 30),
            },
            retrieval: RetrievalConfig {
                index_path: env_string("RAG_INDEX_PATH", "vectorstore/index.json"),
                top_k: env_or("RAG_TOP_K", 3),
                embedding_model: env_string("EMBEDDING_MODEL", "text-embedding-004"),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether the token secret is still the development fallback
    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}
