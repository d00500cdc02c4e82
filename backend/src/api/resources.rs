//! Resource catalog and counseling request endpoints

use crate::api::utils::{require_user, ApiState};
use crate::auth::AuthUser;
use crate::content::{self, Resource};
use crate::error::AppError;
use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Resource catalog
#[derive(Debug, Serialize)]
pub struct ResourcesResponse {
    /// Always true
    pub success: bool,
    /// All resources
    pub resources: &'static [Resource],
}

/// Acknowledgement of a counseling request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselingResponse {
    /// Always true
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Fresh request id
    pub request_id: String,
}

/// GET /api/resources - Curated parent resources
pub async fn list_resources() -> Json<ResourcesResponse> {
    Json(ResourcesResponse {
        success: true,
        resources: content::resources(),
    })
}

/// POST /api/counseling/request - Mock counseling request
///
/// Nothing is stored or forwarded; the caller only gets a request id.
pub async fn request_counseling(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<CounselingResponse>, AppError> {
    let user = require_user(&state, &auth).await?;
    let request_id = Uuid::new_v4().to_string();
    info!(user_id = %user.id, request_id = %request_id, "Counseling requested");

    Ok(Json(CounselingResponse {
        success: true,
        message: "Counseling request submitted. A counselor will contact you within 24 hours."
            .to_string(),
        request_id,
    }))
}
