//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use self::metrics::{
    create_metrics_router, init_metrics, record_gateway_call, record_http_request,
    record_ingestion, record_query, PrometheusMetrics,
};
