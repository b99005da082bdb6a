use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use estatesmith::config::Settings;
use estatesmith::health::HealthMonitor;
use estatesmith::providers::groq::GroqClient;
use estatesmith::providers::pinecone::PineconeClient;
use estatesmith::query::{AnswerGenerator, RagPipeline, Retriever};
use estatesmith::server::{AppState, router};
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

    let pinecone = PineconeClient::new(&settings.pinecone_api_key, &settings.embedding_model);
    let index = pinecone
        .ensure_index(
            &settings.pinecone_index_name,
            settings.embedding_dimension,
            &settings.pinecone_region,
            INDEX_READY_WAIT,
        )
        .await?;
    let chat = GroqClient::new(
        &settings.groq_api_key,
        &settings.groq_model,
        settings.temperature,
        settings.max_tokens,
    );

    let embedder = Arc::new(pinecone);
    let index = Arc::new(index);
    let chat = Arc::new(chat);

    let pipeline = RagPipeline::new(
        Retriever::new(embedder.clone(), index.clone()),
        AnswerGenerator::new(chat.clone()),
        settings.top_k,
    );
    let monitor = HealthMonitor::new(index, chat);

    let addr = settings.server_addr.clone();
    let state = AppState {
        pipeline: Arc::new(pipeline),
        monitor: Arc::new(monitor),
        settings: Arc::new(settings),
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| RagError::Configuration(format!("cannot bind {addr}: {err}")))?;
    info!(%addr, "serving");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| RagError::Configuration(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
