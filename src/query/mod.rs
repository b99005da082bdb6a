//! The query orchestrator: validate → retrieve → generate → assemble.
//!
//! Provider failures never escape this module as errors. Retrieval and
//! generation each get a bounded retry budget; exhaustion degrades into a
//! well-formed [`QueryOutcome`] carrying a generic user-facing message plus
//! the underlying error detail. Only input validation returns `Err`
//! ([`RagError::InvalidQuery`]), since that maps to a client error rather
//! than a degraded answer.

pub mod generate;
pub mod retrieve;

use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::retry::RetryPolicy;
use crate::types::RagError;

pub use generate::{AnswerGenerator, EMPTY_CONTEXT};
pub use retrieve::{RetrievedChunk, Retriever};

const MIN_QUERY_CHARS: usize = 3;
const RETRIEVAL_FAILURE_MESSAGE: &str =
    "Sorry, I encountered a database error. Please try again.";
const GENERATION_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate a response. Please try again.";

/// Per-query knobs supplied by the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryOptions {
    /// Overrides the configured default top-k when set.
    pub top_k: Option<usize>,
    /// Include the raw retrieved chunks in the outcome.
    pub include_chunks: bool,
}

/// Final result record for one query. Always well-formed, even when a
/// stage failed after its retry budget.
#[derive(Clone, Debug)]
pub struct QueryOutcome {
    pub query: String,
    pub response: String,
    pub response_time: Duration,
    pub chunks_retrieved: usize,
    pub retrieved_chunks: Option<Vec<RetrievedChunk>>,
    /// Underlying error detail when a stage degraded.
    pub error: Option<String>,
}

impl QueryOutcome {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

pub struct RagPipeline {
    retriever: Retriever,
    generator: AnswerGenerator,
    retry: RetryPolicy,
    default_top_k: usize,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, generator: AnswerGenerator, default_top_k: usize) -> Self {
        Self {
            retriever,
            generator,
            retry: RetryPolicy::default(),
            default_top_k,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Runs the full retrieve → format → generate flow for one query.
    ///
    /// Stages execute strictly in sequence on the calling task; the
    /// pipeline holds no per-query state, so independent invocations may
    /// run concurrently over the same shared provider handles.
    pub async fn query(
        &self,
        raw_query: &str,
        options: QueryOptions,
    ) -> Result<QueryOutcome, RagError> {
        let query = raw_query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(RagError::InvalidQuery(
                "query too short; please provide more details".into(),
            ));
        }

        info!(query, "query received");
        let started = Instant::now();
        let top_k = options.top_k.unwrap_or(self.default_top_k);

        let chunks = match self
            .retry
            .run("retrieval", || self.retriever.retrieve(query, top_k))
            .await
        {
            Ok(chunks) => chunks,
            Err(err) => {
                error!(%err, "retrieval failed after retries");
                return Ok(QueryOutcome {
                    query: query.to_string(),
                    response: RETRIEVAL_FAILURE_MESSAGE.to_string(),
                    response_time: started.elapsed(),
                    chunks_retrieved: 0,
                    retrieved_chunks: options.include_chunks.then(Vec::new),
                    error: Some(err.to_string()),
                });
            }
        };

        info!(retrieved = chunks.len(), "retrieval complete");
        if let Some(best) = chunks.first() {
            info!(location = %best.location, score = best.score, "top match");
        }

        let context = AnswerGenerator::format_context(&chunks);
        let (response, generation_error) = match self
            .retry
            .run("generation", || self.generator.generate(query, &context))
            .await
        {
            Ok(response) => (response, None),
            Err(err) => {
                error!(%err, "generation failed after retries");
                (GENERATION_FAILURE_MESSAGE.to_string(), Some(err.to_string()))
            }
        };

        let response_time = started.elapsed();
        info!(elapsed_ms = response_time.as_millis() as u64, "query completed");

        Ok(QueryOutcome {
            query: query.to_string(),
            response,
            response_time,
            chunks_retrieved: chunks.len(),
            retrieved_chunks: options.include_chunks.then_some(chunks),
            error: generation_error,
        })
    }
}
