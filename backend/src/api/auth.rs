//! Signup and login endpoints
//!
//! Business failures (duplicate email, bad credentials) come back as
//! `success: false` with a message; malformed input is a 400.

use crate::api::utils::{ApiState, UserResponse};
use crate::db::{Role, User};
use crate::error::AppError;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Request to create an account
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Parent or child
    pub role: Role,
    /// Display name
    pub name: String,
    /// Age, required for children
    pub age: Option<i64>,
}

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Outcome of signup or login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// Session token on success
    pub token: Option<String>,
    /// The account on success
    pub user: Option<UserResponse>,
    /// Human-readable outcome
    pub message: Option<String>,
}

impl AuthResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            token: None,
            user: None,
            message: Some(message.to_string()),
        }
    }

    fn success(token: String, user: &User, message: &str) -> Self {
        Self {
            success: true,
            token: Some(token),
            user: Some(UserResponse::from(user)),
            message: Some(message.to_string()),
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

fn validate_signup(request: &SignupRequest) -> Result<(), AppError> {
    if !is_plausible_email(&request.email) {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }
    if let Some(age) = request.age {
        if !(1..=100).contains(&age) {
            return Err(AppError::InvalidInput(
                "Age must be between 1 and 100".to_string(),
            ));
        }
    }
    Ok(())
}

/// POST /api/auth/signup - Register a parent or child account
pub async fn signup(
    State(state): State<ApiState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_signup(&request)?;
    let email = request.email.trim();

    if state.db.get_user_by_email(email).await?.is_some() {
        return Ok(Json(AuthResponse::failure("Email already registered")));
    }
    if request.role == Role::Child && request.age.is_none() {
        return Ok(Json(AuthResponse::failure("Age is required for children")));
    }

    let password_hash = state.credentials.hash_password(&request.password).await?;
    let user = User::new(
        email.to_string(),
        password_hash,
        request.role,
        request.name.trim().to_string(),
        request.age,
    );
    // A concurrent signup can take the email after the lookup above.
    if !state.db.create_user(&user).await? {
        return Ok(Json(AuthResponse::failure("Email already registered")));
    }
    let token = state.credentials.issue_token(&user.id)?;

    info!(user_id = %user.id, role = %user.role, "Account created");
    Ok(Json(AuthResponse::success(
        token,
        &user,
        "Account created successfully",
    )))
}

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let Some(user) = state.db.get_user_by_email(request.email.trim()).await? else {
        return Ok(Json(AuthResponse::failure("Invalid email or password")));
    };

    if !state
        .credentials
        .verify_password(&request.password, &user.password_hash)
        .await?
    {
        return Ok(Json(AuthResponse::failure("Invalid email or password")));
    }

    let token = state.credentials.issue_token(&user.id)?;
    info!(user_id = %user.id, "Login successful");
    Ok(Json(AuthResponse::success(token, &user, "Login successful")))
}
