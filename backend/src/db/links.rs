//! Parent-child link queries

use super::models::{ParentChildLink, User};
use super::Db;
use crate::error::AppError;
use chrono::Utc;
use tracing::debug;

impl Db {
    /// Link a parent to a child; duplicate links are allowed
    pub async fn link_parent_child(
        &self,
        parent_id: &str,
        child_id: &str,
    ) -> Result<ParentChildLink, AppError> {
        let link = ParentChildLink {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: parent_id.to_string(),
            child_id: child_id.to_string(),
            created_at: Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO parent_child_links (id, parent_id, child_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&link.id)
        .bind(&link.parent_id)
        .bind(&link.child_id)
        .bind(link.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to link parent and child: {}", e)))?;

        debug!(parent_id = %parent_id, child_id = %child_id, "Linked parent to child");
        Ok(link)
    }

    /// First linked parent of a child, if any
    pub async fn find_parent_of(&self, child_id: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT parent_id FROM parent_child_links WHERE child_id = ? ORDER BY created_at ASC, rowid ASC LIMIT 1",
        )
        .bind(child_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to look up parent: {}", e)))
    }

    /// Distinct children linked to a parent, by name
    pub async fn get_children_of_parent(&self, parent_id: &str) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.role, u.name, u.age, u.created_at FROM users u \
             WHERE u.id IN (SELECT child_id FROM parent_child_links WHERE parent_id = ?) \
             ORDER BY u.name ASC",
        )
        .bind(parent_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch children: {}", e)))
    }

    /// Whether a parent is linked to a child
    pub async fn is_linked(&self, parent_id: &str, child_id: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM parent_child_links WHERE parent_id = ? AND child_id = ?",
        )
        .bind(parent_id)
        .bind(child_id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to check link: {}", e)))?;

        Ok(count > 0)
    }
}
