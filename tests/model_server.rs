//! Server-backed clients against a mock model server.

use docsage::config::{EmbeddingSettings, GenerationSettings, ServerSettings};
use docsage::embedding::{Embedder, OpenAIEmbedder};
use docsage::error::DocsageError;
use docsage::generation::{ChatGenerator, Generator};
use docsage::ollama::{OllamaClient, PullEvent};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_settings(server: &MockServer) -> ServerSettings {
    ServerSettings {
        host: server.uri(),
        request_timeout_secs: 5,
        ..ServerSettings::default()
    }
}

fn embedding_body(vectors: &[(u32, Vec<f32>)]) -> serde_json::Value {
    json!({
        "object": "list",
        "model": "all-minilm",
        "data": vectors
            .iter()
            .map(|(index, v)| json!({ "index": index, "object": "embedding", "embedding": v }))
            .collect::<Vec<_>>(),
        "usage": { "prompt_tokens": 4, "total_tokens": 4 }
    })
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "llama3",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

#[tokio::test]
async fn test_embedder_restores_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "model": "all-minilm" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[
            (1, vec![0.0, 1.0, 0.0]),
            (0, vec![1.0, 0.0, 0.0]),
        ])))
        .mount(&server)
        .await;

    let settings = EmbeddingSettings {
        dimensions: None,
        ..EmbeddingSettings::default()
    };
    let embedder = OpenAIEmbedder::new(&server_settings(&server), &settings).unwrap();

    let vectors = embedder
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
    assert_eq!(embedder.dimensions(), Some(3));
}

#[tokio::test]
async fn test_embedder_rejects_unexpected_dimension() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_body(&[(0, vec![0.5; 256])])),
        )
        .mount(&server)
        .await;

    let embedder =
        OpenAIEmbedder::new(&server_settings(&server), &EmbeddingSettings::default()).unwrap();

    let err = embedder.embed("query").await.unwrap_err();
    assert!(matches!(
        err,
        DocsageError::DimensionMismatch { expected: 384, actual: 256 }
    ));
}

#[tokio::test]
async fn test_embedder_rejects_short_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[(0, vec![1.0])])))
        .mount(&server)
        .await;

    let settings = EmbeddingSettings {
        dimensions: None,
        ..EmbeddingSettings::default()
    };
    let embedder = OpenAIEmbedder::new(&server_settings(&server), &settings).unwrap();

    let err = embedder
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, DocsageError::Embedding(_)));
}

#[tokio::test]
async fn test_embedder_accepts_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "input": [""] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_body(&[(0, vec![0.0; 384])])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let embedder =
        OpenAIEmbedder::new(&server_settings(&server), &EmbeddingSettings::default()).unwrap();

    let vector = embedder.embed("").await.unwrap();
    assert_eq!(vector.len(), 384);
}

#[tokio::test]
async fn test_embedder_repeated_and_batched_calls_agree() {
    let server = MockServer::start().await;
    let vector: Vec<f32> = (0..384).map(|i| i as f32 / 384.0).collect();
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({ "input": ["How do I migrate to Jakarta EE?"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[(0, vector.clone())])))
        .expect(3)
        .mount(&server)
        .await;

    let embedder =
        OpenAIEmbedder::new(&server_settings(&server), &EmbeddingSettings::default()).unwrap();
    let text = "How do I migrate to Jakarta EE?";

    let first = embedder.embed(text).await.unwrap();
    let second = embedder.embed(text).await.unwrap();
    let batch = embedder.embed_batch(&[text.to_string()]).await.unwrap();

    assert_eq!(first, vector);
    assert_eq!(first, second);
    assert_eq!(batch, vec![first]);
}

#[tokio::test]
async fn test_embedder_rejects_duplicate_indices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[
            (0, vec![1.0, 0.0]),
            (0, vec![0.0, 1.0]),
        ])))
        .mount(&server)
        .await;

    let settings = EmbeddingSettings {
        dimensions: None,
        ..EmbeddingSettings::default()
    };
    let embedder = OpenAIEmbedder::new(&server_settings(&server), &settings).unwrap();

    let err = embedder
        .embed_batch(&["first".to_string(), "second".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, DocsageError::Embedding(_)));
}

#[tokio::test]
async fn test_generator_sends_prompt_and_token_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "max_tokens": 150,
            "messages": [{
                "role": "user",
                "content": "Context: Jakarta EE replaces Java EE.\nQuestion: What replaces javax?\nAnswer:"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(" jakarta.* \n")))
        .expect(1)
        .mount(&server)
        .await;

    let generator =
        ChatGenerator::new(&server_settings(&server), &GenerationSettings::default()).unwrap();

    let answer = generator
        .generate("What replaces javax?", "Jakarta EE replaces Java EE.", 150)
        .await
        .unwrap();
    assert_eq!(answer, "jakarta.*");
}

#[tokio::test]
async fn test_generator_blank_reply_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
        .mount(&server)
        .await;

    let generator =
        ChatGenerator::new(&server_settings(&server), &GenerationSettings::default()).unwrap();

    let err = generator.generate("q", "context", 150).await.unwrap_err();
    assert!(matches!(err, DocsageError::GenerationFailure(_)));
}

#[tokio::test]
async fn test_generator_client_error_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "message": "model \"llama3\" not found, try pulling it first",
                "type": "api_error",
                "param": null,
                "code": null
            }
        })))
        .mount(&server)
        .await;

    let generator =
        ChatGenerator::new(&server_settings(&server), &GenerationSettings::default()).unwrap();

    let err = generator.generate("q", "context", 150).await.unwrap_err();
    match err {
        DocsageError::GenerationFailure(msg) => assert!(msg.contains("not found")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_list_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "llama3:latest", "size": 4_661_224_676u64 },
                { "name": "all-minilm:latest", "size": 45_960_996u64 }
            ]
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server_settings(&server)).unwrap();
    let models = client.list_models().await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "llama3:latest");
    assert_eq!(models[1].size_bytes, 45_960_996);
}

#[tokio::test]
async fn test_pull_streams_progress_until_success() {
    let server = MockServer::start().await;
    let body = concat!(
        "{\"status\":\"pulling manifest\"}\n",
        "{\"status\":\"pulling 6a0746a1ec1a\",\"total\":100,\"completed\":40}\n",
        "{\"status\":\"pulling 6a0746a1ec1a\",\"total\":100,\"completed\":100}\n",
        "{\"status\":\"success\"}\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(json!({ "model": "all-minilm" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server_settings(&server)).unwrap();
    let events: Vec<_> = client.pull("all-minilm").await.unwrap().collect().await;

    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0].as_ref().unwrap(),
        &PullEvent::Status("pulling manifest".to_string())
    );
    assert_eq!(events[1].as_ref().unwrap().percent(), Some(40));
    assert_eq!(events[2].as_ref().unwrap().percent(), Some(100));
    assert_eq!(events[3].as_ref().unwrap(), &PullEvent::Success);
}

#[tokio::test]
async fn test_pull_reports_server_error_line() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "{\"error\":\"pull model manifest: file does not exist\"}\n",
            "application/x-ndjson",
        ))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server_settings(&server)).unwrap();
    let events: Vec<_> = client.pull("no-such-model").await.unwrap().collect().await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Err(DocsageError::ModelPull(msg)) if msg.contains("does not exist")));
}

#[tokio::test]
async fn test_pull_rejected_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid model name"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server_settings(&server)).unwrap();
    match client.pull("Bad Name").await {
        Err(DocsageError::ModelPull(msg)) => assert!(msg.contains("invalid model name")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected the pull to be rejected"),
    }
}
