//! Crate-wide error taxonomy.
//!
//! Four failure classes with distinct handling policies:
//!
//! - [`RagError::Configuration`] — missing credentials or nonsensical
//!   settings. Fatal at startup, never retried.
//! - [`RagError::Provider`] — an external call (embedding, index, LLM)
//!   failed. Retried with backoff at the orchestrator boundary, then
//!   converted into a degraded user-facing result.
//! - [`RagError::InvalidQuery`] — input validation failure. Surfaced
//!   immediately; maps to a client error at the HTTP boundary.
//! - [`RagError::Precondition`] — an internal shape mismatch (e.g. chunk
//!   count vs embedding count). Aborts the ingestion batch; retrying cannot
//!   change a shape mismatch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{provider} provider call failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("precondition violated: {0}")]
    Precondition(String),
}

impl RagError {
    /// Shorthand for a provider failure tagged with the provider name.
    pub fn provider(provider: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Provider {
            provider,
            message: err.to_string(),
        }
    }
}
