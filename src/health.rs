//! Service health probes and lightweight query metrics.
//!
//! The monitor keeps lock-free counters updated by the request path and
//! runs on-demand probes against the vector index and the chat model when
//! a health report is requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

use crate::providers::{ChatModel, VectorIndex};

const SLOW_INDEX_PROBE: Duration = Duration::from_secs(1);
const SLOW_CHAT_PROBE: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Clone, Debug, Serialize)]
pub struct ComponentHealth {
    pub status: ServiceStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HealthReport {
    pub overall_status: ServiceStatus,
    pub vector_index: ComponentHealth,
    pub chat_model: ComponentHealth,
    pub metrics: QueryMetrics,
}

/// Aggregated counters since process start.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct QueryMetrics {
    pub uptime_seconds: u64,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub error_rate: f64,
    pub avg_response_time_ms: u64,
}

pub struct HealthMonitor {
    started: Instant,
    queries: AtomicU64,
    errors: AtomicU64,
    total_response_ms: AtomicU64,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
}

impl HealthMonitor {
    pub fn new(index: Arc<dyn VectorIndex>, chat: Arc<dyn ChatModel>) -> Self {
        Self {
            started: Instant::now(),
            queries: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            total_response_ms: AtomicU64::new(0),
            index,
            chat,
        }
    }

    /// Records one completed query. Degraded outcomes count as errors.
    pub fn record_query(&self, response_time: Duration, is_error: bool) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.total_response_ms
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);
        if is_error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn metrics(&self) -> QueryMetrics {
        let total = self.queries.load(Ordering::Relaxed);
        let failed = self.errors.load(Ordering::Relaxed);
        let total_ms = self.total_response_ms.load(Ordering::Relaxed);
        QueryMetrics {
            uptime_seconds: self.started.elapsed().as_secs(),
            total_queries: total,
            failed_queries: failed,
            error_rate: if total == 0 {
                0.0
            } else {
                failed as f64 / total as f64
            },
            avg_response_time_ms: if total == 0 { 0 } else { total_ms / total },
        }
    }

    /// Probes both providers and folds the results into one report.
    /// A failed probe marks the component unhealthy; a slow probe or an
    /// empty index only degrades it.
    pub async fn check_all(&self) -> HealthReport {
        let vector_index = self.probe_index().await;
        let chat_model = self.probe_chat().await;

        let overall_status = [vector_index.status, chat_model.status]
            .into_iter()
            .max_by_key(|status| match status {
                ServiceStatus::Healthy => 0,
                ServiceStatus::Degraded => 1,
                ServiceStatus::Unhealthy => 2,
            })
            .unwrap_or(ServiceStatus::Healthy);

        HealthReport {
            overall_status,
            vector_index,
            chat_model,
            metrics: self.metrics(),
        }
    }

    async fn probe_index(&self) -> ComponentHealth {
        let started = Instant::now();
        match self.index.stats().await {
            Ok(stats) => {
                let elapsed = started.elapsed();
                let (status, detail) = if stats.total_vector_count == 0 {
                    (
                        ServiceStatus::Degraded,
                        Some("index contains no vectors".to_string()),
                    )
                } else if elapsed > SLOW_INDEX_PROBE {
                    (ServiceStatus::Degraded, Some("slow index probe".to_string()))
                } else {
                    (ServiceStatus::Healthy, None)
                };
                ComponentHealth {
                    status,
                    latency_ms: elapsed.as_millis() as u64,
                    detail,
                }
            }
            Err(err) => {
                warn!(%err, "vector index probe failed");
                ComponentHealth {
                    status: ServiceStatus::Unhealthy,
                    latency_ms: started.elapsed().as_millis() as u64,
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    async fn probe_chat(&self) -> ComponentHealth {
        let started = Instant::now();
        match self.chat.complete(None, "ping").await {
            Ok(_) => {
                let elapsed = started.elapsed();
                let (status, detail) = if elapsed > SLOW_CHAT_PROBE {
                    (ServiceStatus::Degraded, Some("slow model response".to_string()))
                } else {
                    (ServiceStatus::Healthy, None)
                };
                ComponentHealth {
                    status,
                    latency_ms: elapsed.as_millis() as u64,
                    detail,
                }
            }
            Err(err) => {
                warn!(%err, "chat model probe failed");
                ComponentHealth {
                    status: ServiceStatus::Unhealthy,
                    latency_ms: started.elapsed().as_millis() as u64,
                    detail: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::stores::{IndexStats, PropertyVector, ScoredMatch};
    use crate::types::RagError;

    struct FakeIndex {
        count: u64,
        fail: bool,
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn fetch_existing(&self, _ids: &[String]) -> Result<Vec<String>, RagError> {
            Ok(Vec::new())
        }

        async fn upsert(&self, _vectors: &[PropertyVector]) -> Result<(), RagError> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<ScoredMatch>, RagError> {
            Ok(Vec::new())
        }

        async fn stats(&self) -> Result<IndexStats, RagError> {
            if self.fail {
                return Err(RagError::provider("pinecone", "connection refused"));
            }
            Ok(IndexStats {
                total_vector_count: self.count,
            })
        }
    }

    struct FakeChat {
        fail: bool,
    }

    #[async_trait]
    impl crate::providers::ChatModel for FakeChat {
        async fn complete(
            &self,
            _system: Option<&str>,
            _user: &str,
        ) -> Result<String, RagError> {
            if self.fail {
                return Err(RagError::provider("groq", "timeout"));
            }
            Ok("pong".to_string())
        }
    }

    fn monitor(index: FakeIndex, chat: FakeChat) -> HealthMonitor {
        HealthMonitor::new(Arc::new(index), Arc::new(chat))
    }

    #[tokio::test]
    async fn all_probes_passing_is_healthy() {
        let monitor = monitor(FakeIndex { count: 42, fail: false }, FakeChat { fail: false });
        let report = monitor.check_all().await;
        assert_eq!(report.overall_status, ServiceStatus::Healthy);
    }

    #[tokio::test]
    async fn empty_index_degrades_but_does_not_fail() {
        let monitor = monitor(FakeIndex { count: 0, fail: false }, FakeChat { fail: false });
        let report = monitor.check_all().await;
        assert_eq!(report.overall_status, ServiceStatus::Degraded);
        assert_eq!(report.vector_index.status, ServiceStatus::Degraded);
        assert_eq!(report.chat_model.status, ServiceStatus::Healthy);
    }

    #[tokio::test]
    async fn failing_chat_probe_is_unhealthy() {
        let monitor = monitor(FakeIndex { count: 5, fail: false }, FakeChat { fail: true });
        let report = monitor.check_all().await;
        assert_eq!(report.overall_status, ServiceStatus::Unhealthy);
        assert_eq!(report.chat_model.status, ServiceStatus::Unhealthy);
    }

    #[tokio::test]
    async fn metrics_track_counts_and_error_rate() {
        let monitor = monitor(FakeIndex { count: 5, fail: false }, FakeChat { fail: false });
        monitor.record_query(Duration::from_millis(100), false);
        monitor.record_query(Duration::from_millis(300), true);
        let metrics = monitor.metrics();
        assert_eq!(metrics.total_queries, 2);
        assert_eq!(metrics.failed_queries, 1);
        assert!((metrics.error_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(metrics.avg_response_time_ms, 200);
    }
}
