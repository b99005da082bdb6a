//! Ingestion: turning provider listings into vector-store ready batches.
//!
//! Three stages:
//!
//! * [`records`] — the listing model, the scraping-provider field mapping,
//!   and the built-in fixture set.
//! * [`summary`] — canonical text summaries and chunk construction.
//! * [`pipeline`] — the end-to-end run: records → chunks → embeddings →
//!   deduplicated upload.

pub mod pipeline;
pub mod records;
pub mod summary;

pub use pipeline::{IngestReport, ingest_records};
pub use records::{PropertyRecord, sample_records};
pub use summary::{PropertyChunk, build_chunks, summarize};
