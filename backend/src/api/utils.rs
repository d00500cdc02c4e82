//! Shared handler state and helpers

use crate::auth::{AuthUser, CredentialService};
use crate::db::{Db, Role, User};
use crate::error::AppError;
use crate::pipeline::ChatPipeline;
use serde::Serialize;
use std::sync::Arc;

/// Maximum chat message length in characters
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// State shared by every handler
#[derive(Clone)]
pub struct ApiState {
    /// Persistence store
    pub db: Arc<Db>,
    /// Chat pipeline (model client plus optional retrieval index)
    pub pipeline: Arc<ChatPipeline>,
    /// Token and password handling
    pub credentials: Arc<CredentialService>,
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// User id
    pub id: String,
    /// Login email
    pub email: String,
    /// Parent or child
    pub role: Role,
    /// Display name
    pub name: String,
    /// Age, if set
    pub age: Option<i64>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            age: user.age,
        }
    }
}

/// Validate a chat message
///
/// # Returns
/// * `Ok(())` - Message is non-blank and within [`MAX_MESSAGE_LENGTH`]
/// * `Err(AppError::InvalidInput)` - Otherwise
pub fn validate_message(message: &str) -> Result<(), AppError> {
    if message.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Message cannot be empty".to_string(),
        ));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Message exceeds maximum length of {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}

/// Load the account behind an authenticated request
pub async fn require_user(state: &ApiState, auth: &AuthUser) -> Result<User, AppError> {
    state
        .db
        .get_user_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Load the account and insist on a role, 403 otherwise
pub async fn require_role(
    state: &ApiState,
    auth: &AuthUser,
    role: Role,
    denial: &str,
) -> Result<User, AppError> {
    let user = require_user(state, auth).await?;
    if user.role != role {
        tracing::debug!(user_id = %user.id, role = %user.role, "Role check failed");
        return Err(AppError::Forbidden(denial.to_string()));
    }
    Ok(user)
}
