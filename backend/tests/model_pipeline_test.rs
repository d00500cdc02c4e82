//! Chat pipeline against mocked provider APIs
//!
//! Verifies that both provider adapters feed the same pipeline and that the
//! parent turn sends retrieved context to the model.

use awareme_backend::config::Config;
use awareme_backend::llm::{GeminiClient, HuggingFaceClient};
use awareme_backend::pipeline::ChatPipeline;
use awareme_backend::retrieval::{GeminiEmbedder, IndexEntry, RetrievalIndex, VectorIndex};
use mockito::{Matcher, Server};
use serial_test::serial;
use std::sync::Arc;

const HF_REPO: &str = "mistralai/Mistral-7B-Instruct-v0.2";

fn test_config() -> Config {
    let mut config = Config::from_env();
    config.llm.gemini_api_key = "test-key".to_string();
    config.llm.gemini_model = "gemini-2.5-flash".to_string();
    config.llm.huggingface_api_key = "hf-key".to_string();
    config.llm.huggingface_repo = HF_REPO.to_string();
    config.retrieval.embedding_model = "text-embedding-004".to_string();
    config
}

fn entry(source: &str, text: &str, embedding: Vec<f32>) -> IndexEntry {
    IndexEntry {
        source: source.to_string(),
        text: text.to_string(),
        embedding,
    }
}

#[tokio::test]
#[serial]
async fn test_parent_turn_sends_retrieved_context_to_gemini() {
    let mut server = Server::new_async().await;
    let embed_mock = server
        .mock("POST", "/models/text-embedding-004:embedContent")
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_body(r#"{"embedding": {"values": [2.0, 0.0]}}"#)
        .expect(2)
        .create_async()
        .await;
    let generate_mock = server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Regex(
            "Teach the correct names for body parts".to_string(),
        ))
        .with_status(200)
        .with_body(
            r#"{"candidates": [{"content": {"parts": [{"text": "Use correct names."}], "role": "model"}}]}"#,
        )
        .create_async()
        .await;

    let config = test_config();
    let http = reqwest::Client::new();
    let model = GeminiClient::new(http.clone(), &config.llm).with_base_url(server.url());
    let embedder = GeminiEmbedder::new(http, &config.llm, &config.retrieval).with_base_url(server.url());
    let index = VectorIndex::new(
        "text-embedding-004",
        vec![
            entry("names.md", "Teach the correct names for body parts.", vec![1.0, 0.0]),
            entry("online.md", "Keep devices in shared rooms.", vec![0.0, 1.0]),
        ],
    )
    .unwrap();
    let retrieval = RetrievalIndex::new(index, Arc::new(embedder));
    let pipeline = ChatPipeline::new(Arc::new(model), Some(Arc::new(retrieval)), 1);

    let context = pipeline
        .retrieve_context("How do I start talking about bodies?")
        .await;
    assert_eq!(context, "Teach the correct names for body parts.");

    let reply = pipeline
        .handle_parent_turn("How do I start talking about bodies?")
        .await
        .unwrap();

    assert_eq!(reply, "Use correct names.");
    embed_mock.assert_async().await;
    generate_mock.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_child_turn_with_huggingface_provider() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", format!("/models/{}", HF_REPO).as_str())
        .match_header("authorization", "Bearer hf-key")
        .match_body(Matcher::Regex(r"\[INST\]".to_string()))
        .with_status(200)
        .with_body(r#"[{"generated_text": "  You did the right thing telling me. 🌟  "}]"#)
        .create_async()
        .await;

    let config = test_config();
    let model = HuggingFaceClient::new(reqwest::Client::new(), &config.llm).with_base_url(server.url());
    let pipeline = ChatPipeline::new(Arc::new(model), None, 3);

    let turn = pipeline
        .handle_child_turn("I feel AFRAID at night", "child-1", Some(6))
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(turn.distress_detected);
    assert_eq!(turn.response, "You did the right thing telling me. 🌟");
}

#[tokio::test]
#[serial]
async fn test_parent_turn_survives_embedding_outage() {
    let mut server = Server::new_async().await;
    let _embed_mock = server
        .mock("POST", "/models/text-embedding-004:embedContent")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;
    let generate_mock = server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "General advice."}]}}]}"#)
        .create_async()
        .await;

    let config = test_config();
    let http = reqwest::Client::new();
    let model = GeminiClient::new(http.clone(), &config.llm).with_base_url(server.url());
    let embedder = GeminiEmbedder::new(http, &config.llm, &config.retrieval).with_base_url(server.url());
    let index = VectorIndex::new(
        "text-embedding-004",
        vec![entry("names.md", "Teach the correct names.", vec![1.0, 0.0])],
    )
    .unwrap();
    let pipeline = ChatPipeline::new(
        Arc::new(model),
        Some(Arc::new(RetrievalIndex::new(index, Arc::new(embedder)))),
        3,
    );

    let reply = pipeline.handle_parent_turn("Any tips?").await.unwrap();

    assert_eq!(reply, "General advice.");
    generate_mock.assert_async().await;
}
