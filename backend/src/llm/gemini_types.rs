//! Gemini API wire types
//!
//! Structs that mirror the Gemini JSON request/response format
//! (camelCase on the wire).

use serde::{Deserialize, Serialize};

/// Top-level `generateContent` response
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiResponse {
    /// List of candidate responses from the model
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Optional feedback about the prompt (e.g., if it was blocked)
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of this candidate (absent when generation was cut off early)
    #[serde(default)]
    pub content: Option<Content>,
    /// Why the model stopped generating (if applicable)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content structure containing parts of the response
#[derive(Deserialize, Debug)]
pub struct Content {
    /// List of content parts (typically one text part)
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Role of the content (e.g., "model")
    #[serde(default)]
    pub role: Option<String>,
}

/// A single part of content
#[derive(Deserialize, Debug)]
pub struct Part {
    /// The text content of this part (non-text parts carry none)
    #[serde(default)]
    pub text: Option<String>,
}

/// Feedback about the prompt (e.g., if it was blocked)
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked (if applicable)
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Request structure for `generateContent`
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiRequest {
    /// System instruction steering the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<RequestContent>,
    /// Conversation turns to send
    pub contents: Vec<RequestContent>,
    /// Optional generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Content structure for requests
#[derive(Serialize, Debug)]
pub struct RequestContent {
    /// Author of the turn ("user" / "model"); omitted for system instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// List of content parts
    pub parts: Vec<RequestPart>,
}

impl RequestContent {
    /// A single text part with an optional role
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![RequestPart {
                text: text.to_string(),
            }],
        }
    }
}

/// A single part for requests
#[derive(Serialize, Debug)]
pub struct RequestPart {
    /// The text content
    pub text: String,
}

/// Generation configuration for requests
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Request structure for `embedContent`
#[derive(Serialize, Debug)]
pub struct EmbedContentRequest {
    /// Fully qualified model name (`models/<name>`)
    pub model: String,
    /// Text to embed
    pub content: RequestContent,
}

/// Response of `embedContent`
#[derive(Deserialize, Debug)]
pub struct EmbedContentResponse {
    /// The embedding
    pub embedding: ContentEmbedding,
}

/// Embedding vector
#[derive(Deserialize, Debug)]
pub struct ContentEmbedding {
    /// Vector components
    pub values: Vec<f32>,
}
