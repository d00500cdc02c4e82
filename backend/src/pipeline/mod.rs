//! Chat pipeline
//!
//! Turns one user message into one model reply. Child turns also run the
//! distress heuristic; parent turns are grounded in retrieved reference
//! material when an index is loaded. Persistence and alerting stay with the
//! caller, which keeps this module free of storage concerns.

pub mod alerts;
pub mod distress;
pub mod prompts;

pub use alerts::{decide_alert, distress_alert_message, AlertDecision, CHAT_ALERT_LOCATION};
pub use distress::{detect_distress, matched_keywords};

use crate::llm::{LanguageModel, LlmError};
use crate::retrieval::RetrievalIndex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Separator between retrieved documents in the parent context
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Result of a child turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildTurn {
    /// Model reply text
    pub response: String,
    /// Whether the child's message matched a distress keyword
    pub distress_detected: bool,
}

/// Prompt construction, model invocation and retrieval for both audiences
pub struct ChatPipeline {
    model: Arc<dyn LanguageModel>,
    retrieval: Option<Arc<RetrievalIndex>>,
    top_k: usize,
}

impl ChatPipeline {
    /// Create a pipeline; `retrieval` is `None` when no index could be loaded
    pub fn new(
        model: Arc<dyn LanguageModel>,
        retrieval: Option<Arc<RetrievalIndex>>,
        top_k: usize,
    ) -> Self {
        Self {
            model,
            retrieval,
            top_k,
        }
    }

    /// Whether parent turns are grounded in retrieved context
    pub fn has_retrieval(&self) -> bool {
        self.retrieval.is_some()
    }

    /// Name of the underlying model client
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run a child turn
    pub async fn handle_child_turn(
        &self,
        message: &str,
        user_id: &str,
        age: Option<u32>,
    ) -> Result<ChildTurn, LlmError> {
        let system = prompts::child_system_prompt(age);
        let response = self.model.complete(&system, message).await?.into_text();
        let distress_detected = detect_distress(message);

        debug!(
            user_id = %user_id,
            model = %self.model.name(),
            distress_detected,
            response_len = response.len(),
            "Child turn completed"
        );

        Ok(ChildTurn {
            response,
            distress_detected,
        })
    }

    /// Run a parent turn
    pub async fn handle_parent_turn(&self, message: &str) -> Result<String, LlmError> {
        let context = self.retrieve_context(message).await;
        let system = prompts::parent_system_prompt(&context);
        let response = self.model.complete(&system, message).await?.into_text();

        debug!(
            model = %self.model.name(),
            context_len = context.len(),
            response_len = response.len(),
            "Parent turn completed"
        );

        Ok(response)
    }

    /// Reference text for a parent question, empty when retrieval is
    /// unavailable or fails
    pub async fn retrieve_context(&self, message: &str) -> String {
        let Some(retrieval) = &self.retrieval else {
            return String::new();
        };

        match retrieval.query(message, self.top_k).await {
            Ok(documents) => {
                debug!(
                    documents = documents.len(),
                    sources = ?documents.iter().map(|d| d.source.as_str()).collect::<Vec<_>>(),
                    "Retrieved parent context"
                );
                documents
                    .into_iter()
                    .map(|d| d.text)
                    .collect::<Vec<_>>()
                    .join(CONTEXT_SEPARATOR)
            }
            Err(e) => {
                warn!(error = %e, "Retrieval failed, answering without context");
                String::new()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::llm::{LanguageModel, LlmError, ModelReply};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Model that replays a canned reply and records every prompt it gets
    pub struct RecordingModel {
        reply: Option<ModelReply>,
        /// (system, user) pairs, in call order
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingModel {
        /// Always answer with `reply`
        pub fn replying(reply: ModelReply) -> Self {
            Self {
                reply: Some(reply),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Always fail like an unreachable upstream
        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// System instruction of the most recent call
        pub fn last_system(&self) -> String {
            self.calls
                .lock()
                .unwrap()
                .last()
                .map(|(system, _)| system.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, system: &str, user: &str) -> Result<ModelReply, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.reply
                .clone()
                .ok_or_else(|| LlmError::Request("connection refused".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingModel;
    use super::*;
    use crate::llm::ModelReply;
    use crate::retrieval::test_support::{keyword_index, FailingEmbedder, KeywordEmbedder};

    fn pipeline_with(model: Arc<RecordingModel>, retrieval: Option<RetrievalIndex>) -> ChatPipeline {
        ChatPipeline::new(model, retrieval.map(Arc::new), 3)
    }

    fn keyword_retrieval() -> RetrievalIndex {
        keyword_index(Arc::new(KeywordEmbedder {
            keywords: vec!["touch", "secret", "adult"],
        }))
    }

    #[tokio::test]
    async fn test_child_turn_detects_distress_from_message() {
        let model = Arc::new(RecordingModel::replying(ModelReply::Message {
            content: "It's okay to feel that way. 💛 Talk to a trusted adult.".to_string(),
        }));
        let pipeline = pipeline_with(model.clone(), None);

        let turn = pipeline
            .handle_child_turn("I am feeling uncomfortable.", "child-1", Some(8))
            .await
            .unwrap();

        assert!(turn.distress_detected);
        assert_eq!(
            turn.response,
            "It's okay to feel that way. 💛 Talk to a trusted adult."
        );
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("8 years old"));
        assert_eq!(calls[0].1, "I am feeling uncomfortable.");
    }

    #[tokio::test]
    async fn test_child_turn_ignores_keywords_in_reply() {
        let model = Arc::new(RecordingModel::replying(ModelReply::Text(
            "If anyone ever hurts you, ask for help!".to_string(),
        )));
        let pipeline = pipeline_with(model, None);

        let turn = pipeline
            .handle_child_turn("What is a good touch?", "child-1", None)
            .await
            .unwrap();

        assert!(!turn.distress_detected);
    }

    #[tokio::test]
    async fn test_child_turn_default_age() {
        let model = Arc::new(RecordingModel::replying(ModelReply::Text("Hi!".to_string())));
        let pipeline = pipeline_with(model.clone(), None);

        pipeline
            .handle_child_turn("hello", "child-1", None)
            .await
            .unwrap();

        assert!(model.last_system().contains("9 years old"));
    }

    #[tokio::test]
    async fn test_child_turn_propagates_model_failure() {
        let pipeline = pipeline_with(Arc::new(RecordingModel::failing()), None);
        let result = pipeline.handle_child_turn("I'm scared", "child-1", None).await;
        assert!(matches!(result, Err(LlmError::Request(_))));
    }

    #[tokio::test]
    async fn test_parent_turn_uses_ranked_context() {
        let model = Arc::new(RecordingModel::replying(ModelReply::Message {
            content: "Start with body autonomy.".to_string(),
        }));
        let pipeline = pipeline_with(model.clone(), Some(keyword_retrieval()));

        let reply = pipeline
            .handle_parent_turn("How do I explain a secret about touch?")
            .await
            .unwrap();

        assert_eq!(reply, "Start with body autonomy.");
        let system = model.last_system();
        let expected = "Unsafe touch often comes with a secret.\n\n\
                        Teach good touch and bad touch.\n\n\
                        Surprises are fine, secrets are not.";
        assert!(system.contains(expected), "{}", system);
        assert!(!system.contains("List five trusted adults."));
    }

    #[tokio::test]
    async fn test_parent_turn_without_index_has_empty_context() {
        let model = Arc::new(RecordingModel::replying(ModelReply::Text("Advice".to_string())));
        let pipeline = pipeline_with(model.clone(), None);

        let reply = pipeline.handle_parent_turn("Any tips?").await.unwrap();

        assert_eq!(reply, "Advice");
        assert!(!pipeline.has_retrieval());
        assert_eq!(model.last_system(), prompts::parent_system_prompt(""));
    }

    #[tokio::test]
    async fn test_parent_turn_degrades_when_retrieval_fails() {
        let model = Arc::new(RecordingModel::replying(ModelReply::Text("Advice".to_string())));
        let pipeline = pipeline_with(
            model.clone(),
            Some(keyword_index(Arc::new(FailingEmbedder))),
        );

        let reply = pipeline.handle_parent_turn("Any tips?").await.unwrap();

        assert_eq!(reply, "Advice");
        assert_eq!(model.last_system(), prompts::parent_system_prompt(""));
    }

    #[tokio::test]
    async fn test_parent_turn_propagates_model_failure() {
        let pipeline = pipeline_with(Arc::new(RecordingModel::failing()), Some(keyword_retrieval()));
        assert!(pipeline.handle_parent_turn("Any tips?").await.is_err());
    }
}
