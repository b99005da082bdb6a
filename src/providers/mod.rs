//! Adapters for the external services the pipeline coordinates.
//!
//! Each provider sits behind a trait so the orchestrator, store and tests
//! are not tied to a specific vendor:
//!
//! - [`EmbeddingProvider`] — text → fixed-dimension vectors, with the
//!   provider's asymmetric passage/query tagging preserved.
//! - [`VectorIndex`] — the managed index's data plane (fetch, upsert,
//!   similarity query, stats).
//! - [`ChatModel`] — one-shot chat completion against a hosted LLM.
//!
//! Concrete implementations: [`pinecone`] (embeddings + index),
//! [`groq`] (LLM), and a deterministic [`mock`] embedder for tests and
//! offline runs.

pub mod groq;
pub mod mock;
pub mod pinecone;

use async_trait::async_trait;

use crate::stores::{IndexStats, PropertyVector, ScoredMatch};
use crate::types::RagError;

/// Embedding input tagging. Ingested documents are embedded as passages,
/// search queries as queries; mixing the two degrades similarity search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputType {
    Passage,
    Query,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Passage => "passage",
            InputType::Query => "query",
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `texts` in order; the result aligns 1:1 with the input.
    async fn embed(&self, texts: &[String], input_type: InputType)
    -> Result<Vec<Vec<f32>>, RagError>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the subset of `ids` already present in the index.
    async fn fetch_existing(&self, ids: &[String]) -> Result<Vec<String>, RagError>;

    /// Inserts or replaces vectors by id.
    async fn upsert(&self, vectors: &[PropertyVector]) -> Result<(), RagError>;

    /// Similarity search, best matches first, metadata included.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredMatch>, RagError>;

    async fn stats(&self) -> Result<IndexStats, RagError>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Issues one completion request and returns the model's text.
    async fn complete(&self, system: Option<&str>, user: &str) -> Result<String, RagError>;
}
