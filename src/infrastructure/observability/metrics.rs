//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("rag_gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Record an HTTP request metric; `route` is the matched route template
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of one ingestion call
pub fn record_ingestion(chunks_indexed: usize, documents_skipped: usize, duration: Duration, success: bool) {
    let labels = [("status", outcome(success).to_string())];

    counter!("rag_ingestions_total", &labels).increment(1);
    histogram!("rag_ingestion_duration_seconds", &labels).record(duration.as_secs_f64());
    counter!("rag_chunks_indexed_total").increment(chunks_indexed as u64);
    counter!("rag_documents_skipped_total").increment(documents_skipped as u64);
}

/// Record the outcome of one query
pub fn record_query(passages: usize, duration: Duration, success: bool) {
    let labels = [("status", outcome(success).to_string())];

    counter!("rag_queries_total", &labels).increment(1);
    histogram!("rag_query_duration_seconds", &labels).record(duration.as_secs_f64());
    histogram!("rag_query_passages").record(passages as f64);
}

/// Record a call to an external gateway (embedding, index, generation)
pub fn record_gateway_call(provider: &str, operation: &str, duration: Duration, success: bool) {
    let labels = [
        ("provider", provider.to_string()),
        ("operation", operation.to_string()),
        ("status", outcome(success).to_string()),
    ];

    counter!("rag_gateway_calls_total", &labels).increment(1);
    histogram!("rag_gateway_call_duration_seconds", &labels).record(duration.as_secs_f64());
}
