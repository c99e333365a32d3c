//! Contract tests for the remote embedding backend against a mock API.
//!
//! The degradation policy is the interesting surface here: a failed batch
//! must not abort the call, must substitute zero vectors of the model
//! dimension for exactly its own texts, and must leave neighboring batches
//! untouched.

use httpmock::prelude::*;
use serde_json::json;

use chunkmill::{
    EmbedderConfig, EmbeddingError, EmbeddingModel, EmbeddingProvider, RemoteEmbeddingProvider,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("chunkmill=debug")
        .try_init();
}

fn provider_for(server: &MockServer, batch_size: usize) -> RemoteEmbeddingProvider {
    let config = EmbedderConfig::new(EmbeddingModel::Small3)
        .with_api_key(Some("test-key".to_string()))
        .with_batch_size(batch_size);
    RemoteEmbeddingProvider::new(&config)
        .unwrap()
        .with_base_url(server.base_url())
}

fn embedding_response(count: usize, fill: f32) -> serde_json::Value {
    let data: Vec<serde_json::Value> = (0..count)
        .map(|index| json!({"index": index, "embedding": [fill, fill, fill]}))
        .collect();
    json!({"data": data})
}

#[tokio::test]
async fn failed_batch_degrades_without_aborting_the_call() {
    init_tracing();
    let server = MockServer::start_async().await;

    // Batches of 2 over 5 texts: ["t1","t2"], ["t3","t4"], ["t5"].
    let first = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings").body_contains("t1");
            then.status(200).json_body(embedding_response(2, 0.1));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings").body_contains("t3");
            then.status(500).json_body(json!({"error": "rate limited"}));
        })
        .await;
    let third = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings").body_contains("t5");
            then.status(200).json_body(embedding_response(1, 0.3));
        })
        .await;

    let provider = provider_for(&server, 2);
    let texts: Vec<String> = ["t1", "t2", "t3", "t4", "t5"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    let embeddings = provider.embed_batch(&texts).await.unwrap();

    assert_eq!(embeddings.len(), 5, "one vector per input text");

    // Batch 1 and 3 are real.
    for embedding in [&embeddings[0], &embeddings[1], &embeddings[4]] {
        assert!(!embedding.is_degraded());
        assert_eq!(embedding.dimension(), 3);
    }

    // Batch 2 degraded to zero vectors of the model dimension.
    for embedding in [&embeddings[2], &embeddings[3]] {
        assert!(embedding.is_degraded());
        assert_eq!(embedding.dimension(), EmbeddingModel::Small3.dimension());
        assert!(embedding.vector.iter().all(|v| *v == 0.0));
    }

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;
}

#[tokio::test]
async fn empty_input_never_contacts_the_backend() {
    let server = MockServer::start_async().await;
    let catch_all = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(200).json_body(embedding_response(1, 0.5));
        })
        .await;

    let provider = provider_for(&server, 4);
    let embeddings = provider.embed_batch(&[]).await.unwrap();
    assert!(embeddings.is_empty());
    assert_eq!(catch_all.hits_async().await, 0);
}

#[tokio::test]
async fn short_response_counts_as_a_failed_batch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            // Two texts submitted, one vector returned.
            then.status(200).json_body(embedding_response(1, 0.2));
        })
        .await;

    let provider = provider_for(&server, 2);
    let texts = vec!["alpha".to_string(), "beta".to_string()];
    let embeddings = provider.embed_batch(&texts).await.unwrap();

    assert_eq!(embeddings.len(), 2);
    assert!(embeddings.iter().all(|e| e.is_degraded()));
}

#[tokio::test]
async fn vectors_follow_the_response_index_field() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            // Indices deliberately reversed relative to array order.
            then.status(200).json_body(json!({
                "data": [
                    {"index": 1, "embedding": [2.0, 2.0, 2.0]},
                    {"index": 0, "embedding": [1.0, 1.0, 1.0]},
                ]
            }));
        })
        .await;

    let provider = provider_for(&server, 2);
    let texts = vec!["first".to_string(), "second".to_string()];
    let embeddings = provider.embed_batch(&texts).await.unwrap();

    assert_eq!(embeddings[0].vector, vec![1.0, 1.0, 1.0]);
    assert_eq!(embeddings[1].vector, vec![2.0, 2.0, 2.0]);
}

#[test]
fn missing_or_empty_credential_is_rejected_up_front() {
    let missing = EmbedderConfig::new(EmbeddingModel::Ada002);
    assert!(matches!(
        RemoteEmbeddingProvider::new(&missing),
        Err(EmbeddingError::MissingCredential { .. })
    ));

    let empty = EmbedderConfig::new(EmbeddingModel::Ada002).with_api_key(Some(String::new()));
    assert!(matches!(
        RemoteEmbeddingProvider::new(&empty),
        Err(EmbeddingError::MissingCredential { .. })
    ));
}
