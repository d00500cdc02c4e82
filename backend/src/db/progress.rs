//! Quiz progress queries

use super::models::ProgressRecord;
use super::Db;
use crate::error::AppError;
use chrono::Utc;
use tracing::debug;

impl Db {
    /// Record one graded quiz submission
    pub async fn append_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        score: i64,
        total: i64,
        passed: bool,
    ) -> Result<ProgressRecord, AppError> {
        let record = ProgressRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            lesson_id: lesson_id.to_string(),
            score,
            total,
            passed,
            created_at: Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO student_progress (id, user_id, lesson_id, score, total, passed, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.lesson_id)
        .bind(record.score)
        .bind(record.total)
        .bind(record.passed)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to save progress: {}", e)))?;

        debug!(
            user_id = %user_id,
            lesson_id = %lesson_id,
            score = score,
            total = total,
            passed = passed,
            "Saved quiz progress"
        );
        Ok(record)
    }

    /// All quiz submissions of a user, newest first
    pub async fn get_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, AppError> {
        sqlx::query_as::<_, ProgressRecord>(
            "SELECT id, user_id, lesson_id, score, total, passed, created_at FROM student_progress \
             WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch progress: {}", e)))
    }
}
