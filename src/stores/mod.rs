//! Vector preparation and deduplicated upload.
//!
//! [`VectorStore`] owns the ingestion-side interaction with the embedding
//! provider and the managed index: batched passage embedding, deterministic
//! vector ids, and an upload path that skips vectors already present.
//!
//! Vector ids are derived from the chunk's position and the trailing path
//! segment of its source URL, so re-ingesting identical input produces
//! identical ids and upserts become naturally idempotent.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ingestion::summary::PropertyChunk;
use crate::providers::{EmbeddingProvider, InputType, VectorIndex};
use crate::retry::RetryPolicy;
use crate::types::RagError;

/// Longest text stored in the indexed `text` metadata field; the full text
/// is kept alongside it for generation.
const METADATA_TEXT_LIMIT: usize = 1000;

/// How many leading vector ids are probed for duplicates before upload.
/// A sample, not an exhaustive check: it bounds dedup latency at the cost
/// of missing duplicates past the prefix.
const DEDUP_SAMPLE_SIZE: usize = 10;

/// A vector ready for upsert into the managed index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// Metadata stored next to each vector in the index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// Truncated display text (≤ 1000 chars).
    #[serde(default)]
    pub text: String,
    /// Untruncated chunk text; the source of truth at generation time.
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub bedrooms: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub property_url: String,
    #[serde(default)]
    pub chunk_index: usize,
}

/// One similarity-search match as returned by the index.
#[derive(Clone, Debug, Deserialize)]
pub struct ScoredMatch {
    pub score: f32,
    #[serde(default)]
    pub metadata: VectorMetadata,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct IndexStats {
    pub total_vector_count: u64,
}

/// Outcome of one deduplicated upload.
#[derive(Clone, Copy, Debug, Default)]
pub struct UploadReport {
    pub uploaded: usize,
    pub skipped_duplicates: usize,
}

pub struct VectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    embed_batch_size: usize,
    upload_batch_size: usize,
    retry: RetryPolicy,
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedder,
            index,
            embed_batch_size: 100,
            upload_batch_size: 100,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_batch_sizes(mut self, embed: usize, upload: usize) -> Self {
        self.embed_batch_size = embed.max(1);
        self.upload_batch_size = upload.max(1);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    /// Embeds `texts` as passages in configured batches, preserving order.
    ///
    /// Any provider failure propagates: partial embeddings are unusable
    /// because downstream pairing relies on 1:1 alignment with the input.
    pub async fn embed_passages(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embed_batch_size) {
            let batch_embeddings = self.embedder.embed(batch, InputType::Passage).await?;
            if batch_embeddings.len() != batch.len() {
                return Err(RagError::provider(
                    "embedding",
                    format!(
                        "provider returned {} embeddings for {} inputs",
                        batch_embeddings.len(),
                        batch.len()
                    ),
                ));
            }
            embeddings.extend(batch_embeddings);
        }
        Ok(embeddings)
    }

    /// Zips chunks with their embeddings into upsert-ready vectors.
    ///
    /// The id `chunk_{position}_{url basename}` is deterministic, which is
    /// the basis for deduplication across re-ingestion runs.
    pub fn prepare_vectors(
        chunks: &[PropertyChunk],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<PropertyVector>, RagError> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::Precondition(format!(
                "{} chunks but {} embeddings; refusing to pair them",
                chunks.len(),
                embeddings.len()
            )));
        }

        Ok(chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (chunk, values))| {
                let basename = chunk
                    .metadata
                    .property_url
                    .rsplit('/')
                    .next()
                    .unwrap_or_default();
                PropertyVector {
                    id: format!("chunk_{position}_{basename}"),
                    values,
                    metadata: VectorMetadata {
                        text: chunk.text.chars().take(METADATA_TEXT_LIMIT).collect(),
                        full_text: Some(chunk.text.clone()),
                        title: chunk.metadata.title.clone(),
                        location: chunk.metadata.location.clone(),
                        price: chunk.metadata.price.clone(),
                        property_type: chunk.metadata.property_type.clone(),
                        bedrooms: chunk.metadata.bedrooms.clone(),
                        area: chunk.metadata.area.clone(),
                        property_url: chunk.metadata.property_url.clone(),
                        chunk_index: chunk.metadata.chunk_index,
                    },
                }
            })
            .collect())
    }

    /// Uploads vectors, skipping ids already present in the index.
    ///
    /// Only the first [`DEDUP_SAMPLE_SIZE`] ids are probed; a failed probe
    /// degrades to "assume nothing exists" with a warning, matching the
    /// upload path's tolerance for a read-only pre-check. Upsert failures
    /// are retried with backoff and fatal once retries are exhausted.
    pub async fn upload(&self, vectors: Vec<PropertyVector>) -> Result<UploadReport, RagError> {
        info!(total = vectors.len(), "uploading vectors with deduplication");

        let sample: Vec<String> = vectors
            .iter()
            .take(DEDUP_SAMPLE_SIZE)
            .map(|v| v.id.clone())
            .collect();
        let existing: HashSet<String> = match self.index.fetch_existing(&sample).await {
            Ok(found) => found.into_iter().collect(),
            Err(err) => {
                warn!(%err, "could not check existing vectors; uploading without dedup");
                HashSet::new()
            }
        };

        let total = vectors.len();
        let fresh: Vec<PropertyVector> = vectors
            .into_iter()
            .filter(|v| !existing.contains(&v.id))
            .collect();
        let skipped_duplicates = total - fresh.len();
        if skipped_duplicates > 0 {
            info!(skipped_duplicates, "skipping duplicate vectors");
        }

        if fresh.is_empty() {
            info!("all vectors already exist in index");
            return Ok(UploadReport {
                uploaded: 0,
                skipped_duplicates,
            });
        }

        let uploaded = fresh.len();
        for batch in fresh.chunks(self.upload_batch_size) {
            self.retry
                .run("vector upsert", || self.index.upsert(batch))
                .await?;
        }

        // Observability only; upload success does not depend on it.
        match self.index.stats().await {
            Ok(stats) => info!(
                total_vector_count = stats.total_vector_count,
                "upload completed"
            ),
            Err(err) => warn!(%err, "could not fetch index stats after upload"),
        }

        Ok(UploadReport {
            uploaded,
            skipped_duplicates,
        })
    }
}
