//! Emergency alert queries

use super::models::EmergencyAlert;
use super::Db;
use crate::error::AppError;
use chrono::Utc;
use tracing::info;

impl Db {
    /// Append an alert for a user
    pub async fn append_alert(
        &self,
        user_id: &str,
        message: &str,
        location: Option<&str>,
    ) -> Result<EmergencyAlert, AppError> {
        let alert = EmergencyAlert {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            location: location.map(str::to_string),
            created_at: Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO emergency_alerts (id, user_id, message, location, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&alert.id)
        .bind(&alert.user_id)
        .bind(&alert.message)
        .bind(&alert.location)
        .bind(alert.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create alert: {}", e)))?;

        info!(alert_id = %alert.id, user_id = %user_id, "Emergency alert recorded");
        Ok(alert)
    }

    /// Alerts raised for any child linked to the parent, newest first
    pub async fn get_alerts_for_parent(
        &self,
        parent_id: &str,
    ) -> Result<Vec<EmergencyAlert>, AppError> {
        sqlx::query_as::<_, EmergencyAlert>(
            "SELECT id, user_id, message, location, created_at FROM emergency_alerts \
             WHERE user_id IN (SELECT child_id FROM parent_child_links WHERE parent_id = ?) \
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(parent_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to fetch alerts: {}", e)))
    }
}
