//! Authentication module
//!
//! Credential handling (password hashes, session tokens) and the
//! request extractor that resolves the calling user.

pub mod credentials;
pub mod extractor;

pub use credentials::{Claims, CredentialService};
pub use extractor::AuthUser;

use thiserror::Error;

/// Errors raised while authenticating a request
#[derive(Error, Debug)]
pub enum AuthError {
    /// No `Authorization` header was sent
    #[error("Missing bearer token")]
    MissingToken,

    /// Header present but not of the form `Bearer <token>`
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// Token failed signature or expiry checks
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),
}
