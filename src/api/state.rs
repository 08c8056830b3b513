//! Application state for shared services

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::vector_index::VectorIndex;
use crate::domain::DomainError;
use crate::infrastructure::ingestion::IngestionPipeline;
use crate::infrastructure::query::QueryEngine;

/// Application state shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionPipeline>,
    pub query_engine: Arc<QueryEngine>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        ingestion: IngestionPipeline,
        query_engine: QueryEngine,
        vector_index: Arc<dyn VectorIndex>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            ingestion: Arc::new(ingestion),
            query_engine: Arc::new(query_engine),
            vector_index,
            request_timeout,
        }
    }

    /// Run `operation`, dropping it if it outlives the request timeout
    pub async fn with_deadline<T, F>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        tokio::time::timeout(self.request_timeout, operation)
            .await
            .map_err(|_| DomainError::Timeout {
                seconds: self.request_timeout.as_secs(),
            })?
    }
}
