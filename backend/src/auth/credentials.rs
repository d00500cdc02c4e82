//! Credential service
//!
//! Password hashing (bcrypt) and signed session tokens (HS256 JWT).

use crate::auth::AuthError;
use crate::config::AuthConfig;
use crate::error::AppError;
use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

/// Issues and validates session tokens, hashes and verifies passwords
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    hash_cost: u32,
}

impl CredentialService {
    /// Create a credential service from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::days(config.token_ttl_days),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor (tests use the minimum)
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Issue a signed token for a user id
    pub fn issue_token(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Validate a token and return the user id it was issued for
    pub fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(data.claims.sub)
    }

    /// Hash a password on the blocking pool
    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(anyhow!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(anyhow!("Failed to hash password: {}", e)))
    }

    /// Verify a password against a stored hash on the blocking pool
    ///
    /// A malformed stored hash counts as a mismatch.
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow!("Password verification task failed: {}", e)))?;

        match verified {
            Ok(ok) => Ok(ok),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be verified");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str, ttl_days: i64) -> CredentialService {
        CredentialService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl_days: ttl_days,
        })
        .with_hash_cost(4)
    }

    #[test]
    fn test_token_round_trip() {
        let credentials = service("secret", 7);
        let token = credentials.issue_token("user-1").unwrap();
        assert_eq!(credentials.verify_token(&token).unwrap(), "user-1");
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let token = service("secret-a", 7).issue_token("user-1").unwrap();
        let result = service("secret-b", 7).verify_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative lifetime puts expiry well past the default leeway.
        let credentials = service("secret", -1);
        let token = credentials.issue_token("user-1").unwrap();
        assert!(credentials.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(service("secret", 7).verify_token("not.a.token").is_err());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let credentials = service("secret", 7);
        let hash = credentials.hash_password("secure123").await.unwrap();
        assert_ne!(hash, "secure123");
        assert!(credentials.verify_password("secure123", &hash).await.unwrap());
        assert!(!credentials.verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        let credentials = service("secret", 7);
        assert!(!credentials
            .verify_password("secure123", "not-a-bcrypt-hash")
            .await
            .unwrap());
    }
}
