//! Chat endpoints
//!
//! Runs the chat pipeline for the caller's role, persists the turn and,
//! for children, applies the distress-to-alert policy.

use crate::api::utils::{require_role, require_user, validate_message, ApiState};
use crate::auth::AuthUser;
use crate::db::{ChatRecord, Role};
use crate::error::AppError;
use crate::pipeline::{
    decide_alert, distress_alert_message, matched_keywords, AlertDecision, CHAT_ALERT_LOCATION,
};
use axum::{extract::State, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Most recent records returned by the history endpoint
pub const HISTORY_LIMIT: i64 = 50;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Message text
    pub message: String,
}

/// Chat reply
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Always true; failures are HTTP errors
    pub success: bool,
    /// Model reply text
    pub response: String,
    /// Whether the message tripped the distress heuristic
    pub distress_detected: bool,
    /// RFC 3339 time the reply was produced
    pub timestamp: String,
}

/// Caller's chat history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Always true
    pub success: bool,
    /// Records, newest first
    pub history: Vec<ChatRecord>,
}

/// POST /api/chat/child - Child conversation turn
pub async fn chat_child(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let child = require_role(&state, &auth, Role::Child, "This chat is only for children").await?;
    validate_message(&request.message)?;

    let age = child.age.and_then(|age| u32::try_from(age).ok());
    let turn = state
        .pipeline
        .handle_child_turn(&request.message, &child.id, age)
        .await?;

    state
        .db
        .append_chat(&child.id, &request.message, &turn.response, turn.distress_detected)
        .await?;

    let parent_id = if turn.distress_detected {
        state.db.find_parent_of(&child.id).await?
    } else {
        None
    };
    match decide_alert(turn.distress_detected, parent_id) {
        AlertDecision::Create { parent_id } => {
            let alert = state
                .db
                .append_alert(
                    &child.id,
                    &distress_alert_message(&request.message),
                    Some(CHAT_ALERT_LOCATION),
                )
                .await?;
            info!(
                alert_id = %alert.id,
                child_id = %child.id,
                parent_id = %parent_id,
                keywords = ?matched_keywords(&request.message),
                "Distress alert raised from chat"
            );
        }
        AlertDecision::SkipNoParent => {
            debug!(child_id = %child.id, "Distress detected but no linked parent, alert skipped");
        }
        AlertDecision::SkipNoDistress => {}
    }

    Ok(Json(ChatResponse {
        success: true,
        response: turn.response,
        distress_detected: turn.distress_detected,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/chat/parent - Parent guidance turn
pub async fn chat_parent(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let parent = require_role(&state, &auth, Role::Parent, "This chat is only for parents").await?;
    validate_message(&request.message)?;

    let response = state.pipeline.handle_parent_turn(&request.message).await?;
    state
        .db
        .append_chat(&parent.id, &request.message, &response, false)
        .await?;

    Ok(Json(ChatResponse {
        success: true,
        response,
        distress_detected: false,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/chat/history - Caller's most recent chat turns
pub async fn chat_history(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<HistoryResponse>, AppError> {
    let user = require_user(&state, &auth).await?;
    let history = state.db.get_chat_history(&user.id, HISTORY_LIMIT).await?;
    Ok(Json(HistoryResponse {
        success: true,
        history,
    }))
}
