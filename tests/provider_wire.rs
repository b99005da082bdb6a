//! Wire-level tests for the Pinecone and Groq adapters against a mock
//! HTTP server: request shapes, headers, and response decoding.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use estatesmith::providers::groq::GroqClient;
use estatesmith::providers::pinecone::{PineconeClient, PineconeIndex};
use estatesmith::providers::{ChatModel, EmbeddingProvider, InputType, VectorIndex};
use estatesmith::stores::{PropertyVector, VectorMetadata};
use estatesmith::types::RagError;

fn client(server: &MockServer) -> PineconeClient {
    PineconeClient::new("test-key", "llama-text-embed-v2").with_base_url(server.base_url())
}

fn index(server: &MockServer) -> PineconeIndex {
    PineconeIndex::new(reqwest::Client::new(), "test-key", &server.base_url())
}

#[tokio::test]
async fn embed_tags_passages_and_sends_api_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embed")
                .header("Api-Key", "test-key")
                .header_exists("X-Pinecone-API-Version")
                .json_body_partial(
                    r#"{ "model": "llama-text-embed-v2",
                         "parameters": { "input_type": "passage", "truncate": "END" } }"#,
                );
            then.status(200).json_body(json!({
                "data": [ { "values": [0.1, 0.2] }, { "values": [0.3, 0.4] } ],
            }));
        })
        .await;

    let embeddings = client(&server)
        .embed(
            &["first chunk".to_string(), "second chunk".to_string()],
            InputType::Passage,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
}

#[tokio::test]
async fn embed_tags_queries_differently() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embed")
                .json_body_partial(r#"{ "parameters": { "input_type": "query" } }"#);
            then.status(200)
                .json_body(json!({ "data": [ { "values": [1.0] } ] }));
        })
        .await;

    let embeddings = client(&server)
        .embed(&["2bhk in whitefield".to_string()], InputType::Query)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(embeddings, vec![vec![1.0]]);
}

#[tokio::test]
async fn ensure_index_reuses_an_existing_index() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path("/indexes");
            then.status(200).json_body(json!({
                "indexes": [ { "name": "estate-properties", "host": server.base_url() } ],
            }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/indexes");
            then.status(201).json_body(json!({ "name": "estate-properties", "host": "" }));
        })
        .await;
    let stats = server
        .mock_async(|when, then| {
            when.method(POST).path("/describe_index_stats");
            then.status(200).json_body(json!({ "totalVectorCount": 12 }));
        })
        .await;

    let index = client(&server)
        .ensure_index("estate-properties", 1024, "us-east-1", Duration::ZERO)
        .await
        .unwrap();

    list.assert_async().await;
    stats.assert_async().await;
    assert_eq!(create.hits_async().await, 0);
    assert_eq!(index.stats().await.unwrap().total_vector_count, 12);
}

#[tokio::test]
async fn ensure_index_creates_when_missing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/indexes");
            then.status(200).json_body(json!({ "indexes": [] }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/indexes").json_body_partial(
                r#"{ "name": "estate-properties",
                     "dimension": 1024,
                     "metric": "cosine",
                     "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } } }"#,
            );
            then.status(201).json_body(json!({
                "name": "estate-properties",
                "host": server.base_url(),
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/describe_index_stats");
            then.status(200).json_body(json!({ "totalVectorCount": 0 }));
        })
        .await;

    client(&server)
        .ensure_index("estate-properties", 1024, "us-east-1", Duration::ZERO)
        .await
        .unwrap();

    create.assert_async().await;
}

#[tokio::test]
async fn upsert_posts_vectors_with_metadata() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/vectors/upsert")
                .json_body_partial(r#"{ "vectors": [ { "id": "chunk_0_property-sample-1" } ] }"#);
            then.status(200).json_body(json!({ "upsertedCount": 1 }));
        })
        .await;

    let vector = PropertyVector {
        id: "chunk_0_property-sample-1".to_string(),
        values: vec![0.5, 0.6],
        metadata: VectorMetadata {
            text: "Property: Luxury 3BHK".to_string(),
            location: "Whitefield, Bangalore".to_string(),
            ..VectorMetadata::default()
        },
    };
    index(&server).upsert(&[vector]).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn query_sends_top_k_and_decodes_matches() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/query")
                .json_body_partial(r#"{ "topK": 3, "includeMetadata": true }"#);
            then.status(200).json_body(json!({
                "matches": [
                    {
                        "score": 0.93,
                        "metadata": {
                            "text": "2BHK Flat in Electronic City",
                            "location": "Electronic City, Bangalore",
                            "price": "₹ 75 Lakh",
                        },
                    },
                ],
            }));
        })
        .await;

    let matches = index(&server).query(&[0.1, 0.2], 3).await.unwrap();

    mock.assert_async().await;
    assert_eq!(matches.len(), 1);
    assert!((matches[0].score - 0.93).abs() < 1e-6);
    assert_eq!(matches[0].metadata.location, "Electronic City, Bangalore");
    assert_eq!(matches[0].metadata.price, "₹ 75 Lakh");
}

#[tokio::test]
async fn fetch_existing_returns_only_found_ids() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/vectors/fetch");
            then.status(200).json_body(json!({
                "vectors": { "chunk_0_a": { "id": "chunk_0_a" } },
            }));
        })
        .await;

    let found = index(&server)
        .fetch_existing(&["chunk_0_a".to_string(), "chunk_1_a".to_string()])
        .await
        .unwrap();

    assert_eq!(found, vec!["chunk_0_a".to_string()]);
}

#[tokio::test]
async fn fetch_existing_skips_the_request_for_no_ids() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/vectors/fetch");
            then.status(200).json_body(json!({ "vectors": {} }));
        })
        .await;

    let found = index(&server).fetch_existing(&[]).await.unwrap();

    assert!(found.is_empty());
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn http_errors_surface_as_provider_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embed");
            then.status(500).body("internal error");
        })
        .await;

    let result = client(&server)
        .embed(&["text".to_string()], InputType::Passage)
        .await;

    assert!(matches!(
        result,
        Err(RagError::Provider { provider: "pinecone", .. })
    ));
}

#[tokio::test]
async fn chat_completion_sends_messages_and_bearer_auth() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/openai/v1/chat/completions")
                .header("Authorization", "Bearer groq-test-key")
                .json_body_partial(
                    r#"{ "model": "llama-3.3-70b-versatile",
                         "messages": [
                             { "role": "system", "content": "be helpful" },
                             { "role": "user", "content": "list 2bhk flats" }
                         ] }"#,
                );
            then.status(200).json_body(json!({
                "choices": [ { "message": { "content": "Here you go." } } ],
            }));
        })
        .await;

    let chat = GroqClient::new("groq-test-key", "llama-3.3-70b-versatile", 0.1, 1024)
        .with_base_url(server.base_url());
    let answer = chat
        .complete(Some("be helpful"), "list 2bhk flats")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "Here you go.");
}

#[tokio::test]
async fn empty_choices_is_a_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/openai/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let chat = GroqClient::new("groq-test-key", "llama-3.3-70b-versatile", 0.1, 1024)
        .with_base_url(server.base_url());
    let result = chat.complete(None, "anything").await;

    assert!(matches!(
        result,
        Err(RagError::Provider { provider: "groq", .. })
    ));
}
