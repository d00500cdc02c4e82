//! Persisted row types
//!
//! Defines structures for users, parent-child links, chat history,
//! emergency alerts and quiz progress.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Account role, fixed at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    /// Parent or guardian account
    Parent,
    /// Child account
    Child,
}

impl Role {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "child" => Ok(Role::Child),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Login email, unique across users
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Parent or child
    pub role: Role,
    /// Display name
    pub name: String,
    /// Age in years (always set for children)
    pub age: Option<i64>,
    /// When the account was created (Unix timestamp)
    pub created_at: i64,
}

impl User {
    /// Build a new user row with a fresh id
    pub fn new(
        email: String,
        password_hash: String,
        role: Role,
        name: String,
        age: Option<i64>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            role,
            name,
            age,
            created_at: Utc::now().timestamp(),
        }
    }

    /// Whether this is a parent account
    pub fn is_parent(&self) -> bool {
        self.role == Role::Parent
    }

    /// Whether this is a child account
    pub fn is_child(&self) -> bool {
        self.role == Role::Child
    }
}

/// Directed link from a parent to a child account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParentChildLink {
    /// Unique identifier
    pub id: String,
    /// Parent user id
    pub parent_id: String,
    /// Child user id
    pub child_id: String,
    /// When the link was created (Unix timestamp)
    pub created_at: i64,
}

/// One chat turn as stored in history
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    /// Unique identifier
    pub id: String,
    /// Author of the message
    pub user_id: String,
    /// Raw user input
    pub message: String,
    /// Model response
    pub response: String,
    /// Whether the distress heuristic fired
    pub distress_detected: bool,
    /// When the turn was stored (Unix timestamp)
    pub created_at: i64,
}

/// An emergency alert raised for a user
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlert {
    /// Unique identifier
    pub id: String,
    /// Subject of the alert
    pub user_id: String,
    /// Free-text message
    pub message: String,
    /// Optional location hint
    pub location: Option<String>,
    /// When the alert was raised (Unix timestamp)
    pub created_at: i64,
}

/// Outcome of one quiz submission
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Unique identifier
    pub id: String,
    /// Student user id
    pub user_id: String,
    /// Lesson the quiz belongs to
    pub lesson_id: String,
    /// Number of correct answers
    pub score: i64,
    /// Number of questions in the lesson
    pub total: i64,
    /// Whether the pass threshold was met
    pub passed: bool,
    /// When the quiz was submitted (Unix timestamp)
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("parent".parse::<Role>().unwrap(), Role::Parent);
        assert_eq!("child".parse::<Role>().unwrap(), Role::Child);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Child.to_string(), "child");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Parent).unwrap();
        assert_eq!(json, "\"parent\"");
        let role: Role = serde_json::from_str("\"child\"").unwrap();
        assert_eq!(role, Role::Child);
    }
}
