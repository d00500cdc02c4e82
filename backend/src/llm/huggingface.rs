//! Hugging Face inference client
//!
//! Text-generation models return raw text, so replies come back as
//! [`ModelReply::Text`].

use crate::config::LlmConfig;
use crate::llm::gemini::post_json;
use crate::llm::{LanguageModel, LlmError, ModelReply};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
}

#[derive(Serialize, Debug)]
struct GenerationParameters {
    temperature: f32,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Deserialize, Debug)]
struct Generation {
    generated_text: String,
}

/// The inference API answers with a list, a bare object or an error object
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
    Error { error: String },
}

/// Wrap a system instruction and a user message in the Mistral instruct format
pub fn instruct_prompt(system: &str, user: &str) -> String {
    format!("<s>[INST] {}\n\n{} [/INST]", system.trim(), user.trim())
}

/// Hugging Face hosted text-generation client
pub struct HuggingFaceClient {
    http: reqwest::Client,
    api_key: String,
    repo_id: String,
    base_url: String,
    temperature: f32,
    max_new_tokens: u32,
}

impl HuggingFaceClient {
    /// Create a client from the model configuration
    pub fn new(http: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            http,
            api_key: config.huggingface_api_key.clone(),
            repo_id: config.huggingface_repo.clone(),
            base_url: config.huggingface_api_base_url.clone(),
            temperature: config.temperature,
            max_new_tokens: config.max_output_tokens,
        }
    }

    /// Point the client at another base URL (mock servers in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LanguageModel for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<ModelReply, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let url = format!("{}/models/{}", self.base_url, self.repo_id);
        let request_body = GenerationRequest {
            inputs: instruct_prompt(system, user),
            parameters: GenerationParameters {
                temperature: self.temperature,
                max_new_tokens: self.max_new_tokens,
                return_full_text: false,
            },
        };

        tracing::debug!(
            repo_id = %self.repo_id,
            prompt_len = request_body.inputs.len(),
            "Calling Hugging Face inference API"
        );

        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body);
        let parsed: GenerationResponse = post_json(request, "Hugging Face").await?;

        let text = match parsed {
            GenerationResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .unwrap_or_default(),
            GenerationResponse::Single(generation) => generation.generated_text,
            GenerationResponse::Error { error } => {
                return Err(LlmError::InvalidResponse(error));
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            tracing::warn!(repo_id = %self.repo_id, "Hugging Face API returned no generated text");
        }
        Ok(ModelReply::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::{Matcher, Server};
    use serial_test::serial;

    const REPO: &str = "mistralai/Mistral-7B-Instruct-v0.2";

    fn client_for(server_url: &str, api_key: &str) -> HuggingFaceClient {
        let mut config = Config::from_env().llm;
        config.huggingface_api_key = api_key.to_string();
        config.huggingface_repo = REPO.to_string();
        config.max_output_tokens = 300;
        HuggingFaceClient::new(reqwest::Client::new(), &config).with_base_url(server_url)
    }

    #[test]
    fn test_instruct_prompt_format() {
        assert_eq!(
            instruct_prompt("Be kind.", " Hi "),
            "<s>[INST] Be kind.\n\nHi [/INST]"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let result = client_for("http://127.0.0.1:9", "").complete("s", "u").await;
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    #[serial]
    async fn test_batch_response_is_raw_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", format!("/models/{}", REPO).as_str())
            .match_header("authorization", "Bearer hf-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "parameters": {"max_new_tokens": 300, "return_full_text": false}
            })))
            .with_status(200)
            .with_body(r#"[{"generated_text": "  Talk to a trusted adult.  "}]"#)
            .create_async()
            .await;

        let reply = client_for(&server.url(), "hf-key")
            .complete("system", "hello")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, ModelReply::Text("Talk to a trusted adult.".to_string()));
    }

    #[tokio::test]
    #[serial]
    async fn test_single_object_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", format!("/models/{}", REPO).as_str())
            .with_status(200)
            .with_body(r#"{"generated_text": "Hello"}"#)
            .create_async()
            .await;

        let reply = client_for(&server.url(), "hf-key")
            .complete("system", "hello")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply.into_text(), "Hello");
    }

    #[tokio::test]
    #[serial]
    async fn test_error_object_is_an_error() {
        let mut server = Server::new_async().await;
        let error_mock = server
            .mock("POST", format!("/models/{}", REPO).as_str())
            .with_status(200)
            .with_body(r#"{"error": "Model is currently loading"}"#)
            .create_async()
            .await;

        let result = client_for(&server.url(), "hf-key")
            .complete("system", "hello")
            .await;
        error_mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(msg)) if msg.contains("loading")));
    }

    #[tokio::test]
    #[serial]
    async fn test_empty_generations_are_empty_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", format!("/models/{}", REPO).as_str())
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let reply = client_for(&server.url(), "hf-key")
            .complete("system", "hello")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(reply, ModelReply::Text(String::new()));
        mock.remove_async().await;

        server
            .mock("POST", format!("/models/{}", REPO).as_str())
            .with_status(200)
            .with_body(r#"[{"generated_text": "   "}]"#)
            .create_async()
            .await;
        let reply = client_for(&server.url(), "hf-key")
            .complete("system", "hello")
            .await
            .unwrap();
        assert_eq!(reply, ModelReply::Text(String::new()));
    }
}
