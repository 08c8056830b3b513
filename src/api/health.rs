//! Health check endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectors: Option<usize>,
    pub latency_ms: u64,
}

/// Returns 200 while the process is up
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Ready once the vector index answers
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let index_check = check_vector_index(&state).await;
    let status = index_check.status;

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![index_check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_vector_index(state: &AppState) -> HealthCheck {
    let start = Instant::now();
    let index = &state.vector_index;
    let name = format!("vector_index:{}", index.provider_type());

    let health = match index.health_check().await {
        Ok(true) => index.count().await.map(Some),
        Ok(false) => Ok(None),
        Err(e) => Err(e),
    };

    match health {
        Ok(Some(vectors)) => HealthCheck {
            name,
            status: HealthStatus::Healthy,
            message: None,
            vectors: Some(vectors),
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Ok(None) => HealthCheck {
            name,
            status: HealthStatus::Unhealthy,
            message: Some("index reported unhealthy".to_string()),
            vectors: None,
            latency_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Vector index health check failed");
            HealthCheck {
                name,
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
                vectors: None,
                latency_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}
