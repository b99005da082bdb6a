//! Ingestion entry point: chunk, embed and upload listings.
//!
//! Pass a JSON file of scraped provider items as the first argument, or
//! run with no arguments to ingest the built-in sample listings.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use estatesmith::config::Settings;
use estatesmith::ingestion::{PropertyRecord, ingest_records, sample_records};
use estatesmith::providers::pinecone::PineconeClient;
use estatesmith::stores::VectorStore;
use estatesmith::types::RagError;

const INDEX_READY_WAIT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), RagError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let records = match std::env::args().nth(1) {
        Some(path) => load_records(&path).await?,
        None => {
            info!("no input file given; using sample listings");
            sample_records()
        }
    };

    let pinecone = PineconeClient::new(&settings.pinecone_api_key, &settings.embedding_model);
    let index = pinecone
        .ensure_index(
            &settings.pinecone_index_name,
            settings.embedding_dimension,
            &settings.pinecone_region,
            INDEX_READY_WAIT,
        )
        .await?;

    let store = VectorStore::new(Arc::new(pinecone), Arc::new(index));
    let report = ingest_records(
        &store,
        &records,
        settings.chunk_size,
        settings.chunk_overlap,
    )
    .await?;

    info!(
        records = report.records,
        chunks = report.chunks,
        uploaded = report.uploaded,
        skipped_duplicates = report.skipped_duplicates,
        "ingestion complete"
    );
    Ok(())
}

async fn load_records(path: &str) -> Result<Vec<PropertyRecord>, RagError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| RagError::Configuration(format!("cannot read {path}: {err}")))?;
    let items: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .map_err(|err| RagError::Configuration(format!("invalid JSON in {path}: {err}")))?;
    info!(path, items = items.len(), "loaded provider items");
    Ok(items.iter().map(PropertyRecord::from_provider_item).collect())
}
