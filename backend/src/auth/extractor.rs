//! Bearer token extractor
//!
//! Handlers that take an [`AuthUser`] argument are only reached with a valid
//! session token; everything else is rejected with 401.

use crate::api::utils::ApiState;
use crate::auth::AuthError;
use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Identity of the authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// User id taken from the token subject
    pub user_id: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(value: &str) -> Result<&str, AuthError> {
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

#[async_trait]
impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        let token = bearer_token(value)?;
        let user_id = state.credentials.verify_token(token)?;

        tracing::debug!(user_id = %user_id, "Authenticated request");
        Ok(AuthUser { user_id })
    }
}
