//! Pinecone adapter: inference embeddings, index lifecycle, and the index
//! data plane.
//!
//! [`PineconeClient`] talks to the control plane (embed endpoint, index
//! list/create); [`PineconeIndex`] is a long-lived handle to one index's
//! data plane. Responses are deserialized into explicit structs so shape
//! mismatches surface as provider errors instead of silent field drops.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::providers::{EmbeddingProvider, InputType, VectorIndex};
use crate::stores::{IndexStats, PropertyVector, ScoredMatch};
use crate::types::RagError;

const DEFAULT_BASE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2025-01";

#[derive(Clone)]
pub struct PineconeClient {
    http: Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
}

impl PineconeClient {
    pub fn new(api_key: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: embedding_model.into(),
        }
    }

    /// Points the client at a different control plane, e.g. a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Idempotent index bootstrap: reuse the index when it exists, create
    /// it otherwise and give the service `ready_wait` to settle.
    pub async fn ensure_index(
        &self,
        name: &str,
        dimension: usize,
        region: &str,
        ready_wait: Duration,
    ) -> Result<PineconeIndex, RagError> {
        let existing = self.list_indexes().await?;
        let description = match existing.into_iter().find(|index| index.name == name) {
            Some(description) => {
                info!(index = name, "index exists");
                description
            }
            None => {
                info!(index = name, dimension, region, "creating index");
                let description = self.create_index(name, dimension, region).await?;
                tokio::time::sleep(ready_wait).await;
                description
            }
        };

        let index = PineconeIndex::new(self.http.clone(), &self.api_key, &description.host);
        match index.stats().await {
            Ok(stats) => info!(
                index = name,
                total_vector_count = stats.total_vector_count,
                "connected to index"
            ),
            Err(err) => tracing::warn!(index = name, %err, "index stats unavailable"),
        }
        Ok(index)
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>, RagError> {
        let response: ListIndexesResponse = self
            .request(self.http.get(format!("{}/indexes", self.base_url)))
            .await?;
        Ok(response.indexes)
    }

    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        region: &str,
    ) -> Result<IndexDescription, RagError> {
        let body = json!({
            "name": name,
            "dimension": dimension,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": "aws", "region": region } },
        });
        self.request(self.http.post(format!("{}/indexes", self.base_url)).json(&body))
            .await
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, RagError> {
        let response = builder
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|err| RagError::provider("pinecone", err))?
            .error_for_status()
            .map_err(|err| RagError::provider("pinecone", err))?;
        response
            .json()
            .await
            .map_err(|err| RagError::provider("pinecone", err))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for PineconeClient {
    async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, RagError> {
        let inputs: Vec<_> = texts.iter().map(|text| json!({ "text": text })).collect();
        let body = json!({
            "model": self.embedding_model,
            "parameters": { "input_type": input_type.as_str(), "truncate": "END" },
            "inputs": inputs,
        });
        let response: EmbedResponse = self
            .request(self.http.post(format!("{}/embed", self.base_url)).json(&body))
            .await?;
        Ok(response.data.into_iter().map(|entry| entry.values).collect())
    }
}

/// Handle to one index's data plane. Stateless per call and cheap to share
/// across concurrent tasks.
#[derive(Clone)]
pub struct PineconeIndex {
    http: Client,
    api_key: String,
    index_url: String,
}

impl PineconeIndex {
    pub fn new(http: Client, api_key: &str, host: &str) -> Self {
        // The control plane reports bare hosts; mock servers hand us full URLs.
        let index_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{host}")
        };
        Self {
            http,
            api_key: api_key.to_string(),
            index_url,
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, RagError> {
        let response = builder
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(|err| RagError::provider("pinecone", err))?
            .error_for_status()
            .map_err(|err| RagError::provider("pinecone", err))?;
        response
            .json()
            .await
            .map_err(|err| RagError::provider("pinecone", err))
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn fetch_existing(&self, ids: &[String]) -> Result<Vec<String>, RagError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
        let response: FetchResponse = self
            .request(
                self.http
                    .get(format!("{}/vectors/fetch", self.index_url))
                    .query(&params),
            )
            .await?;
        Ok(response.vectors.into_keys().collect())
    }

    async fn upsert(&self, vectors: &[PropertyVector]) -> Result<(), RagError> {
        let body = json!({ "vectors": vectors });
        let _: UpsertResponse = self
            .request(
                self.http
                    .post(format!("{}/vectors/upsert", self.index_url))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredMatch>, RagError> {
        let body = json!({
            "vector": embedding,
            "topK": top_k,
            "includeMetadata": true,
        });
        let response: QueryResponse = self
            .request(self.http.post(format!("{}/query", self.index_url)).json(&body))
            .await?;
        Ok(response.matches)
    }

    async fn stats(&self) -> Result<IndexStats, RagError> {
        let response: StatsResponse = self
            .request(
                self.http
                    .post(format!("{}/describe_index_stats", self.index_url))
                    .json(&json!({})),
            )
            .await?;
        Ok(IndexStats {
            total_vector_count: response.total_vector_count,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ListIndexesResponse {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize, Serialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbedEntry {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    #[allow(dead_code)]
    upserted_count: u64,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ScoredMatch>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "totalVectorCount", default)]
    total_vector_count: u64,
}
