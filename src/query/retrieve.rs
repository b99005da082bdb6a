//! Query-time retrieval against the vector index.

use std::sync::Arc;

use serde::Serialize;

use crate::providers::{EmbeddingProvider, InputType, VectorIndex};
use crate::types::RagError;

/// One retrieved chunk, ranked by the index's similarity score
/// (higher = more relevant). Ephemeral; produced per query.
#[derive(Clone, Debug, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
    pub title: String,
    pub location: String,
    pub price: String,
    pub property_type: String,
    pub bedrooms: String,
    pub area: String,
    pub url: String,
}

pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embeds the query (tagged as a query, not a passage — the provider's
    /// asymmetric embedding depends on it), searches the index, and maps
    /// matches in descending score order. No local re-ranking.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        let embeddings = self
            .embedder
            .embed(&[query.to_string()], InputType::Query)
            .await?;
        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::provider("embedding", "no embedding returned for query"))?;

        let matches = self.index.query(&embedding, top_k).await?;

        Ok(matches
            .into_iter()
            .map(|m| {
                let metadata = m.metadata;
                // The indexed `text` field is truncated for display; the
                // untruncated `full_text` is the source of truth.
                let text = metadata.full_text.unwrap_or(metadata.text);
                RetrievedChunk {
                    text,
                    score: m.score,
                    title: metadata.title,
                    location: metadata.location,
                    price: metadata.price,
                    property_type: metadata.property_type,
                    bedrooms: metadata.bedrooms,
                    area: metadata.area,
                    url: metadata.property_url,
                }
            })
            .collect())
    }
}
