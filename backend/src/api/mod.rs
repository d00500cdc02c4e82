//! API module
//!
//! HTTP handlers and the router that ties them to the shared [`ApiState`].

pub mod auth;
pub mod chat;
pub mod emergency;
pub mod learning;
pub mod profile;
pub mod resources;
pub mod utils;

pub use utils::ApiState;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Serialize)]
struct BannerResponse {
    message: String,
    version: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "AwareMe API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

/// CORS for the configured frontend origins
///
/// Credentials are allowed, so origins, methods and headers are listed
/// explicitly. Origins that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the application router
pub fn router(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        // Service info
        .route("/", get(banner))
        .route("/api/health", get(health_check))
        // Accounts
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/profile", get(profile::get_profile))
        .route("/api/profile/children", get(profile::list_children))
        .route("/api/profile/link-child", post(profile::link_child))
        // Chat
        .route("/api/chat/child", post(chat::chat_child))
        .route("/api/chat/parent", post(chat::chat_parent))
        .route("/api/chat/history", get(chat::chat_history))
        // Learning
        .route("/api/learning/lessons", get(learning::list_lessons))
        .route("/api/learning/submit", post(learning::submit_quiz))
        .route("/api/learning/progress", get(learning::my_progress))
        .route(
            "/api/learning/progress/:child_id",
            get(learning::child_progress),
        )
        // Emergency
        .route("/api/emergency/alert", post(emergency::raise_alert))
        .route("/api/emergency/alerts", get(emergency::list_alerts))
        // Resources
        .route("/api/resources", get(resources::list_resources))
        .route(
            "/api/counseling/request",
            post(resources::request_counseling),
        )
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let health = health_check().await.0;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_banner() {
        assert_eq!(banner().await.0.message, "AwareMe API is running");
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Construction must not panic on a bad origin.
        let _layer = cors_layer(&[
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ]);
    }
}
