//! Emergency alert endpoints

use crate::api::utils::{require_role, require_user, ApiState};
use crate::auth::AuthUser;
use crate::db::{EmergencyAlert, Role};
use crate::error::AppError;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Manually raised alert
#[derive(Debug, Deserialize)]
pub struct AlertRequest {
    /// What happened
    pub message: String,
    /// Where the caller is, if known
    pub location: Option<String>,
}

/// Confirmation of a raised alert
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    /// Always true
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Id of the stored alert
    pub alert_id: String,
    /// Emails of the parents who will see the alert
    pub notified_contacts: Vec<String>,
}

/// Alerts visible to a parent
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    /// Always true
    pub success: bool,
    /// Alerts of linked children, newest first
    pub alerts: Vec<EmergencyAlert>,
}

/// POST /api/emergency/alert - Raise an alert for the caller
pub async fn raise_alert(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(request): Json<AlertRequest>,
) -> Result<Json<AlertResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Alert message cannot be empty".to_string(),
        ));
    }
    let user = require_user(&state, &auth).await?;

    let alert = state
        .db
        .append_alert(&user.id, &request.message, request.location.as_deref())
        .await?;

    let mut notified_contacts = Vec::new();
    if user.is_child() {
        if let Some(parent_id) = state.db.find_parent_of(&user.id).await? {
            match state.db.get_user_by_id(&parent_id).await? {
                Some(parent) => notified_contacts.push(parent.email),
                None => warn!(parent_id = %parent_id, "Linked parent account is missing"),
            }
        }
    }

    info!(
        alert_id = %alert.id,
        user_id = %user.id,
        notified = notified_contacts.len(),
        "Emergency alert raised"
    );

    Ok(Json(AlertResponse {
        success: true,
        message: "Emergency alert sent successfully".to_string(),
        alert_id: alert.id,
        notified_contacts,
    }))
}

/// GET /api/emergency/alerts - Alerts of the calling parent's children
pub async fn list_alerts(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<AlertsResponse>, AppError> {
    let parent = require_role(&state, &auth, Role::Parent, "Only parents can view alerts").await?;
    let alerts = state.db.get_alerts_for_parent(&parent.id).await?;
    Ok(Json(AlertsResponse {
        success: true,
        alerts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::utils::test_support::{login_as, test_state};

    fn alert_request(message: &str, location: Option<&str>) -> Json<AlertRequest> {
        Json(AlertRequest {
            message: message.to_string(),
            location: location.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_child_alert_notifies_linked_parent() {
        let (state, _model, _temp_dir) = test_state("unused").await;
        let (parent, parent_auth) = login_as(&state, "mom@example.com", Role::Parent).await;
        let (child, child_auth) = login_as(&state, "kid@example.com", Role::Child).await;
        state.db.link_parent_child(&parent.id, &child.id).await.unwrap();

        let response = raise_alert(
            State(state.clone()),
            child_auth,
            alert_request("I need help!", Some("At home")),
        )
        .await
        .unwrap()
        .0;

        assert!(response.success);
        assert_eq!(response.notified_contacts, vec!["mom@example.com".to_string()]);

        let alerts = list_alerts(State(state), parent_auth).await.unwrap().0;
        assert_eq!(alerts.alerts.len(), 1);
        assert_eq!(alerts.alerts[0].id, response.alert_id);
        assert_eq!(alerts.alerts[0].location.as_deref(), Some("At home"));
    }

    #[tokio::test]
    async fn test_alert_without_parent_notifies_nobody() {
        let (state, _model, _temp_dir) = test_state("unused").await;
        let (_, child_auth) = login_as(&state, "kid@example.com", Role::Child).await;
        let (_, parent_auth) = login_as(&state, "mom@example.com", Role::Parent).await;

        for auth in [child_auth, parent_auth] {
            let response = raise_alert(State(state.clone()), auth, alert_request("Help", None))
                .await
                .unwrap()
                .0;
            assert!(response.notified_contacts.is_empty());
        }
    }

    #[tokio::test]
    async fn test_alert_requires_message() {
        let (state, _model, _temp_dir) = test_state("unused").await;
        let (_, child_auth) = login_as(&state, "kid@example.com", Role::Child).await;
        let result = raise_alert(State(state), child_auth, alert_request(" ", None)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_list_alerts_requires_parent() {
        let (state, _model, _temp_dir) = test_state("unused").await;
        let (_, child_auth) = login_as(&state, "kid@example.com", Role::Child).await;
        let result = list_alerts(State(state), child_auth).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
