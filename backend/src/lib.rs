//! AwareMe Backend Library
//!
//! Child-safety education service: a child chat with distress detection,
//! a parent advice chat grounded in retrieved reference material, lessons,
//! and emergency alerts. The server binary is in `src/main.rs`.

pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod llm;
pub mod pipeline;
/// Retrieval index for parent guidance (RAG)
pub mod retrieval;
