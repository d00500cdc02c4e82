//! User queries

use super::models::User;
use super::Db;
use crate::error::AppError;
use tracing::debug;

impl Db {
    /// Insert a new user, returning `false` when the email is already taken
    pub async fn create_user(&self, user: &User) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, name, age, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.name)
        .bind(user.age)
        .bind(user.created_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => {
                debug!(user_id = %user.id, role = %user.role, "Created user");
                Ok(true)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(email = %user.email, "Email already registered");
                Ok(false)
            }
            Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                "Failed to create user: {}",
                e
            ))),
        }
    }

    /// Look up a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, name, age, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch user: {}", e)))
    }

    /// Look up a user by id
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, name, age, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch user: {}", e)))
    }
}
