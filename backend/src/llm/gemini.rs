//! Gemini API client
//!
//! Direct HTTP client for the Gemini `generateContent` and `embedContent`
//! endpoints.

use crate::config::LlmConfig;
use crate::llm::gemini_types::{
    EmbedContentRequest, EmbedContentResponse, GeminiApiRequest, GeminiApiResponse,
    GenerationConfig, RequestContent,
};
use crate::llm::{LanguageModel, LlmError, ModelReply};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Header carrying the Gemini API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini chat client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a client from the model configuration
    pub fn new(http: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_api_base_url.clone(),
            temperature: config.temperature,
        }
    }

    /// Point the client at another base URL (mock servers in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<ModelReply, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request_body = GeminiApiRequest {
            system_instruction: Some(RequestContent::text(None, system)),
            contents: vec![RequestContent::text(Some("user"), user)],
            generation_config: Some(GenerationConfig {
                temperature: Some(self.temperature),
                max_output_tokens: None,
            }),
        };

        tracing::debug!(
            model = %self.model,
            system_len = system.len(),
            prompt_len = user.len(),
            "Calling Gemini API"
        );

        let request = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body);
        let parsed: GeminiApiResponse = post_json(request, "Gemini").await?;

        // Check for blocked prompt
        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
        {
            return Err(LlmError::Blocked(reason.clone()));
        }

        let Some(candidate) = parsed.candidates.first() else {
            tracing::warn!("Gemini API response contains no candidates");
            return Ok(ModelReply::Message {
                content: String::new(),
            });
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            tracing::warn!(
                finish_reason = ?candidate.finish_reason,
                "Gemini API returned an empty candidate"
            );
        }

        tracing::debug!(
            response_len = text.len(),
            "Successfully received response from Gemini API"
        );

        Ok(ModelReply::Message { content: text })
    }
}

/// Call `embedContent` for one piece of text
pub async fn embed_content(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    text: &str,
) -> Result<Vec<f32>, LlmError> {
    if api_key.is_empty() {
        return Err(LlmError::MissingApiKey);
    }

    let url = format!("{}/models/{}:embedContent", base_url, model);
    let request_body = EmbedContentRequest {
        model: format!("models/{}", model),
        content: RequestContent::text(None, text),
    };

    let request = http
        .post(&url)
        .header(API_KEY_HEADER, api_key)
        .json(&request_body);
    let parsed: EmbedContentResponse = post_json(request, "Gemini embedding").await?;

    if parsed.embedding.values.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(parsed.embedding.values)
}

/// Send a prepared request and decode a JSON body, mapping HTTP failures
pub(crate) async fn post_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    api_name: &str,
) -> Result<T, LlmError> {
    let response = request.send().await.map_err(|e| {
        LlmError::Request(format!(
            "Failed to send HTTP request to {} API: {}",
            api_name,
            e.without_url()
        ))
    })?;

    let status = response.status();
    if !status.is_success() {
        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());

        tracing::error!(
            api = api_name,
            status_code = status_code,
            error_body = %error_body,
            "Model API returned error status"
        );

        if status_code == 429 {
            return Err(LlmError::RateLimited(error_body));
        }
        return Err(LlmError::Status {
            status: status_code,
            body: error_body,
        });
    }

    let response_body = response.text().await.map_err(|e| {
        LlmError::Request(format!(
            "Failed to read response body from {} API: {}",
            api_name,
            e.without_url()
        ))
    })?;

    serde_json::from_str(&response_body).map_err(|e| {
        tracing::error!(
            api = api_name,
            response_body = %response_body,
            "Model API returned an undecodable body"
        );
        LlmError::InvalidResponse(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use mockito::{Matcher, Server};
    use serial_test::serial;

    fn client_for(server_url: &str, api_key: &str) -> GeminiClient {
        let mut config = Config::from_env().llm;
        config.gemini_api_key = api_key.to_string();
        config.gemini_model = "gemini-2.5-flash".to_string();
        GeminiClient::new(reqwest::Client::new(), &config).with_base_url(server_url)
    }


    #[tokio::test]
    async fn test_complete_empty_api_key() {
        let client = client_for("http://127.0.0.1:9", "");
        let result = client.complete("system", "hello").await;
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_success_sends_system_instruction() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "be kind"}]},
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "parts": [{"text": "Hi "}, {"text": "friend!"}],
                            "role": "model"
                        },
                        "finishReason": "STOP"
                    }]
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url(), "test-key");
        let reply = client.complete("be kind", "hello").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            reply,
            ModelReply::Message {
                content: "Hi friend!".to_string()
            }
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_empty_candidates() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let result = client_for(&server.url(), "test-key")
            .complete("system", "hello")
            .await;

        mock.assert_async().await;
        assert_eq!(
            result.unwrap(),
            ModelReply::Message {
                content: String::new()
            }
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_blocked_prompt() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let result = client_for(&server.url(), "test-key")
            .complete("system", "hello")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::Blocked(reason)) if reason == "SAFETY"));
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_rate_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(429)
            .with_body(r#"{"error": "Rate limit exceeded"}"#)
            .create_async()
            .await;

        let result = client_for(&server.url(), "test-key")
            .complete("system", "hello")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::RateLimited(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_server_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let result = client_for(&server.url(), "test-key")
            .complete("system", "hello")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::Status { status: 500, .. })));
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_invalid_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(200)
            .with_body("This is not JSON")
            .create_async()
            .await;

        let result = client_for(&server.url(), "test-key")
            .complete("system", "hello")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_complete_empty_text_is_an_empty_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":""}],"role":"model"},"finishReason":"STOP"}]}"#,
            )
            .create_async()
            .await;

        let reply = client_for(&server.url(), "test-key")
            .complete("system", "hello")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply.into_text(), "");
    }

    #[tokio::test]
    async fn test_key_stays_out_of_transport_errors() {
        let client = client_for("http://127.0.0.1:9", "SUPER-SECRET-KEY");
        let error = client.complete("system", "hello").await.unwrap_err();

        assert!(matches!(error, LlmError::Request(_)));
        assert!(!error.to_string().contains("SUPER-SECRET-KEY"), "got: {}", error);
    }

    #[tokio::test]
    #[serial]
    async fn test_embed_content_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/text-embedding-004:embedContent")
            .match_header(API_KEY_HEADER, "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "models/text-embedding-004"
            })))
            .with_status(200)
            .with_body(r#"{"embedding": {"values": [0.6, 0.8]}}"#)
            .create_async()
            .await;

        let values = embed_content(
            &reqwest::Client::new(),
            &server.url(),
            "test-key",
            "text-embedding-004",
            "good touch",
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(values, vec![0.6, 0.8]);
    }
}
