//! Vector index trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{IndexedVector, ScoredPassage};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Storage for embedded chunks with nearest-neighbour search
///
/// Implementations translate between these entities and a concrete backend
/// (Pinecone, in-memory). Failures surface as `DomainError::IndexService`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Backend name, used in logs and errors
    fn provider_type(&self) -> &'static str;

    /// Vector dimension the index was created with
    fn dimensions(&self) -> usize;

    /// Insert or replace vectors by id; returns the number written
    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<usize, DomainError>;

    /// Top-`k` passages by cosine similarity, best first
    ///
    /// An empty index yields an empty list, never an error.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPassage>, DomainError>;

    /// Check if the index is reachable and ready
    async fn health_check(&self) -> Result<bool, DomainError>;

    /// Number of stored vectors
    async fn count(&self) -> Result<usize, DomainError>;
}
