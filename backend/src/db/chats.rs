//! Chat history queries
//!
//! History is append-only: there is no update or delete path.

use super::models::ChatRecord;
use super::Db;
use crate::error::AppError;
use chrono::Utc;
use tracing::debug;

impl Db {
    /// Append one chat turn
    pub async fn append_chat(
        &self,
        user_id: &str,
        message: &str,
        response: &str,
        distress_detected: bool,
    ) -> Result<ChatRecord, AppError> {
        let record = ChatRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            distress_detected,
            created_at: Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO chat_history (id, user_id, message, response, distress_detected, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.message)
        .bind(&record.response)
        .bind(record.distress_detected)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to save chat message: {}", e)))?;

        debug!(
            chat_id = %record.id,
            user_id = %user_id,
            distress_detected = distress_detected,
            "Saved chat message"
        );
        Ok(record)
    }

    /// Most recent chat turns of a user, newest first
    pub async fn get_chat_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatRecord>, AppError> {
        sqlx::query_as::<_, ChatRecord>(
            "SELECT id, user_id, message, response, distress_detected, created_at FROM chat_history \
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch chat history: {}", e)))
    }
}
