//! Deterministic mock embedding provider for tests and offline runs.
//!
//! Embeddings are seeded from a hash of the input text, so identical text
//! always produces identical vectors and different text (almost) always
//! differs — enough structure for dedup and retrieval plumbing tests
//! without a network dependency.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;

use crate::providers::{EmbeddingProvider, InputType};
use crate::types::RagError;

pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dimension: 32 }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(
        &self,
        texts: &[String],
        _input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                let mut seed = hasher.finish();
                (0..self.dimension)
                    .map(|_| {
                        // xorshift keeps the sequence cheap and repeatable.
                        seed ^= seed << 13;
                        seed ^= seed >> 7;
                        seed ^= seed << 17;
                        (seed % 2000) as f32 / 1000.0 - 1.0
                    })
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_per_text() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec!["hello".to_string(), "world".to_string(), "hello".to_string()];
        let first = provider.embed(&inputs, InputType::Passage).await.unwrap();
        let second = provider.embed(&inputs, InputType::Passage).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_ne!(first[0], first[1]);
        assert_eq!(first[0].len(), 32);
    }
}
