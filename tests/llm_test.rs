// file: tests/llm_test.rs
// description: chat completion and embedding client tests against mocked endpoints
// reference: https://docs.rs/mockito

use askem::embedding::{Embedder, HttpEmbeddingClient};
use askem::{AskemError, ChatClient, EmbeddingConfig, OpenAiConfig};
use mockito::{Matcher, Server};
use serde_json::json;

fn chat_for(server: &Server) -> ChatClient {
    let config = OpenAiConfig {
        api_key: Some("sk-test".to_string()),
        base_url: server.url(),
        max_concurrency: 4,
        ..OpenAiConfig::default()
    };
    ChatClient::new(&config).expect("chat client")
}

fn completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_compress_all_keeps_input_order() {
    let mut server = Server::new_async().await;
    for (needle, reply) in [("alpha chunk", "A"), ("beta chunk", "B"), ("gamma chunk", "C")] {
        server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(needle.to_string()),
                Matcher::Regex("Summarize the upcoming passage into key points precisely.".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion(reply))
            .create_async()
            .await;
    }

    let chunks = vec![
        "alpha chunk".to_string(),
        "beta chunk".to_string(),
        "gamma chunk".to_string(),
    ];
    let compressed = askem::compress_all(&chat_for(&server), &chunks)
        .await
        .expect("compressed");

    assert_eq!(compressed, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_compress_all_fails_on_any_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("good".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("ok"))
        .create_async()
        .await;
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("bad".to_string()))
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let chunks = vec!["good".to_string(), "bad".to_string()];
    let err = askem::compress_all(&chat_for(&server), &chunks)
        .await
        .unwrap_err();

    assert!(matches!(err, AskemError::Upstream { status: 429, .. }));
}

#[tokio::test]
async fn test_get_answer_prompt() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "Study the upcoming passage carefully and answer the questions that follows."},
                {"role": "user", "content": "Glaciers are retreating.Do you understand the passage?"},
                {"role": "user", "content": "Are glaciers growing? Provide your answer in a precise and concise manner."}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("No, they are retreating."))
        .create_async()
        .await;

    let answer = askem::get_answer(
        &chat_for(&server),
        "Glaciers are retreating.",
        "Are glaciers growing?",
    )
    .await
    .expect("answer");

    assert_eq!(answer, "No, they are retreating.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_choices_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"choices": []}).to_string())
        .create_async()
        .await;

    let err = askem::compress(&chat_for(&server), "text").await.unwrap_err();
    assert!(matches!(err, AskemError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_http_embeddings_sorted_and_normalized() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({
            "model": "sentence-transformers/all-mpnet-base-v2",
            "input": ["first", "second"]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"data": [
                {"index": 1, "embedding": [0.0, 2.0]},
                {"index": 0, "embedding": [3.0, 4.0]}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let config = EmbeddingConfig {
        base_url: server.url(),
        ..EmbeddingConfig::default()
    };
    let embedder = HttpEmbeddingClient::new(&config).expect("embedder");
    let embeddings = embedder
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .expect("embeddings");

    assert_eq!(embeddings.len(), 2);
    assert!((embeddings[0][0] - 0.6).abs() < 1e-6);
    assert!((embeddings[0][1] - 0.8).abs() < 1e-6);
    assert_eq!(embeddings[1], vec![0.0, 1.0]);
}

#[tokio::test]
async fn test_http_embeddings_count_mismatch() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"data": [{"index": 0, "embedding": [1.0]}]}).to_string())
        .create_async()
        .await;

    let config = EmbeddingConfig {
        base_url: server.url(),
        ..EmbeddingConfig::default()
    };
    let embedder = HttpEmbeddingClient::new(&config).expect("embedder");
    let err = embedder
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, AskemError::InvalidResponse { .. }));
}
