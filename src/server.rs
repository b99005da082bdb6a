//! HTTP surface for the query pipeline.
//!
//! Three JSON endpoints: `POST /query` runs the pipeline, `GET /health`
//! reports probe results (503 only when a component is hard-down), and
//! `GET /stats` exposes the configured models and index.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::config::Settings;
use crate::health::{HealthMonitor, ServiceStatus};
use crate::query::{QueryOptions, RagPipeline, RetrievedChunk};
use crate::types::RagError;

const MAX_QUERY_CHARS: usize = 500;
const MAX_TOP_K: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
    pub monitor: Arc<HealthMonitor>,
    pub settings: Arc<Settings>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/query", post(handle_query))
        .route("/health", get(handle_health))
        .route("/stats", get(handle_stats))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub include_sources: bool,
}

#[derive(Debug, Serialize)]
pub struct SourceEntry {
    pub rank: usize,
    pub score: f32,
    pub text: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceEntry>>,
    pub response_time: String,
    pub chunks_retrieved: usize,
}

enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::InvalidQuery(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "estatesmith",
        "endpoints": ["/query", "/health", "/stats"],
    }))
}

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let trimmed = request.query.trim();
    if trimmed.chars().count() < 3 {
        return Err(ApiError::BadRequest(
            "query must be at least 3 characters".into(),
        ));
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "query must be at most {MAX_QUERY_CHARS} characters"
        )));
    }
    if let Some(top_k) = request.top_k {
        if top_k == 0 || top_k > MAX_TOP_K {
            return Err(ApiError::BadRequest(format!(
                "top_k must be between 1 and {MAX_TOP_K}"
            )));
        }
    }

    let options = QueryOptions {
        top_k: request.top_k,
        include_chunks: request.include_sources,
    };
    let outcome = state.pipeline.query(trimmed, options).await?;
    state
        .monitor
        .record_query(outcome.response_time, outcome.is_degraded());

    let sources = outcome
        .retrieved_chunks
        .as_deref()
        .map(|chunks| chunks.iter().enumerate().map(source_entry).collect());

    Ok(Json(QueryResponse {
        success: !outcome.is_degraded(),
        response: outcome.response,
        sources,
        response_time: format!("{:.2}s", outcome.response_time.as_secs_f64()),
        chunks_retrieved: outcome.chunks_retrieved,
    }))
}

fn source_entry((idx, chunk): (usize, &RetrievedChunk)) -> SourceEntry {
    SourceEntry {
        rank: idx + 1,
        score: chunk.score,
        text: chunk.text.clone(),
        metadata: json!({
            "title": chunk.title,
            "location": chunk.location,
            "price": chunk.price,
            "property_type": chunk.property_type,
            "bedrooms": chunk.bedrooms,
            "area": chunk.area,
            "url": chunk.url,
        }),
    }
}

async fn handle_health(State(state): State<AppState>) -> Response {
    let report = state.monitor.check_all().await;
    let status = match report.overall_status {
        ServiceStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    info!(status = ?report.overall_status, "health check");
    (status, Json(report)).into_response()
}

async fn handle_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let metrics = state.monitor.metrics();
    Json(json!({
        "embedding_model": state.settings.embedding_model,
        "llm_model": state.settings.groq_model,
        "index_name": state.settings.pinecone_index_name,
        "top_k": state.settings.top_k,
        "metrics": metrics,
    }))
}
