//! Profile and parent-child linking endpoints

use crate::api::utils::{require_role, require_user, ApiState, UserResponse};
use crate::auth::AuthUser;
use crate::db::Role;
use crate::error::AppError;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request to link a child account to the caller
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChildRequest {
    /// Email of the child account
    pub child_email: String,
}

/// Outcome of a link request
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    /// Whether the link was created
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
}

impl LinkResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

/// Linked children of a parent
#[derive(Debug, Serialize)]
pub struct ChildrenResponse {
    /// Always true
    pub success: bool,
    /// Distinct linked child accounts
    pub children: Vec<UserResponse>,
}

/// GET /api/profile - Current user
pub async fn get_profile(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = require_user(&state, &auth).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// GET /api/profile/children - Children linked to the calling parent
pub async fn list_children(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<ChildrenResponse>, AppError> {
    let parent = require_role(&state, &auth, Role::Parent, "Only parents can view children").await?;
    let children = state.db.get_children_of_parent(&parent.id).await?;

    Ok(Json(ChildrenResponse {
        success: true,
        children: children.iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/profile/link-child - Link a child account by email
pub async fn link_child(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(request): Json<LinkChildRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let parent = require_user(&state, &auth).await?;
    if !parent.is_parent() {
        return Ok(Json(LinkResponse::failure("Only parents can link children")));
    }

    let Some(child) = state
        .db
        .get_user_by_email(request.child_email.trim())
        .await?
    else {
        return Ok(Json(LinkResponse::failure("Child account not found")));
    };
    if !child.is_child() {
        return Ok(Json(LinkResponse::failure("User is not a child account")));
    }

    state.db.link_parent_child(&parent.id, &child.id).await?;
    info!(parent_id = %parent.id, child_id = %child.id, "Linked child to parent");

    Ok(Json(LinkResponse {
        success: true,
        message: format!("Successfully linked to {}", child.name),
    }))
}
