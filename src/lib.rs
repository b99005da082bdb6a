//! ```text
//! Provider items / fixtures ──► ingestion::records ──► PropertyRecord
//!                                        │
//!                                        ▼
//!            ingestion::summary ──► PropertyChunk batch
//!                                        │
//!                 ┌──────────────────────┤
//!                 ▼                      ▼
//!   providers::pinecone (embed)   stores::VectorStore
//!                 │                (dedup + batched upsert)
//!                 ▼                      │
//!          managed vector index ◄───────┘
//!
//! Query text ──► query::RagPipeline ──► Retriever ──► AnswerGenerator
//!                         │                                  │
//!                         └──────────► QueryOutcome ◄────────┘
//! ```
//!
//! The crate is a coordination layer over three external services: an
//! embedding/index provider, a hosted LLM, and (optionally) a scraping
//! provider whose items arrive as JSON. The interesting logic lives in
//! [`chunking`] (boundary-aware splitting), [`stores`] (idempotent upload)
//! and [`query`] (retrieve → format → generate with bounded retries).

pub mod chunking;
pub mod config;
pub mod health;
pub mod ingestion;
pub mod providers;
pub mod query;
pub mod retry;
pub mod server;
pub mod stores;
pub mod types;

pub use config::Settings;
pub use query::{QueryOptions, QueryOutcome, RagPipeline, RetrievedChunk};
pub use retry::RetryPolicy;
pub use types::RagError;
