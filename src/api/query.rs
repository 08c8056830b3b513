//! Question answering endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::api::state::AppState;
use crate::api::types::{ApiError, QueryParams, QueryResponse};

/// `GET /query?query=...&k=...` - answer from the indexed documents
pub async fn query(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Query(params) =
        params.map_err(|e| ApiError::bad_request(format!("Invalid query parameters: {}", e.body_text())))?;

    let result = state
        .with_deadline(state.query_engine.query(&params.query, params.k))
        .await?;

    Ok(Json(QueryResponse {
        query: params.query,
        answer: result.answer,
        passages: result.chunks,
    }))
}
