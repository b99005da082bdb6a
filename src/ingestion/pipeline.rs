//! End-to-end ingestion run: records → chunks → embeddings → upload.

use tracing::info;

use crate::ingestion::records::PropertyRecord;
use crate::ingestion::summary::{PropertyChunk, build_chunks};
use crate::stores::VectorStore;
use crate::types::RagError;

/// Summary of one ingestion run.
#[derive(Clone, Copy, Debug, Default)]
pub struct IngestReport {
    pub records: usize,
    pub chunks: usize,
    pub uploaded: usize,
    pub skipped_duplicates: usize,
}

/// Chunks, embeds and uploads a batch of records.
///
/// Embedding failures abort the run (partial embeddings cannot be paired);
/// upload failures abort after the store's retry budget is exhausted.
pub async fn ingest_records(
    store: &VectorStore,
    records: &[PropertyRecord],
    chunk_size: usize,
    overlap: usize,
) -> Result<IngestReport, RagError> {
    info!(records = records.len(), "processing records into chunks");

    let mut chunks: Vec<PropertyChunk> = Vec::new();
    for record in records {
        chunks.extend(build_chunks(record, chunk_size, overlap)?);
    }
    info!(chunks = chunks.len(), "created chunks");

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
    let embeddings = store.embed_passages(&texts).await?;

    let vectors = VectorStore::prepare_vectors(&chunks, embeddings)?;
    let upload = store.upload(vectors).await?;

    Ok(IngestReport {
        records: records.len(),
        chunks: chunks.len(),
        uploaded: upload.uploaded,
        skipped_duplicates: upload.skipped_duplicates,
    })
}
