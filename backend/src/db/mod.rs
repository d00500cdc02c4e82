//! Persistence store
//!
//! SQLite access for users, parent-child links, chat history, emergency
//! alerts and quiz progress. Every write goes through a pooled connection;
//! no transaction spans more than one statement.

pub mod alerts;
pub mod chats;
pub mod links;
pub mod models;
pub mod progress;
pub mod users;

pub use models::{ChatRecord, EmergencyAlert, ParentChildLink, ProgressRecord, Role, User};

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Database connection pool for all application tables
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Initialize database connection pool and apply the schema
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(Db)` if successful
    /// * `Err(AppError)` if connection or migration failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
                })?;
            }
        }

        // SQLite connection string format: sqlite:path/to/db.db
        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
            })?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_schema.sql");

        for statement in split_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the database pool (for advanced operations if needed)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Strip `--` comments and split a migration script into statements
fn split_statements(sql: &str) -> Vec<String> {
    let mut cleaned_sql = String::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        let without_comments = match trimmed.find("--") {
            Some(comment_pos) => &trimmed[..comment_pos],
            None => trimmed,
        };
        cleaned_sql.push_str(without_comments.trim());
        cleaned_sql.push(' ');
    }

    cleaned_sql
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
