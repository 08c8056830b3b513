//! In-memory vector index for development and testing

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::embedding::cosine_similarity;
use crate::domain::vector_index::{IndexedVector, ScoredPassage, VectorIndex};
use crate::domain::DomainError;

/// Brute-force cosine index kept in process memory
///
/// Ties are broken by insertion order, so results are deterministic.
#[derive(Debug, Clone)]
pub struct InMemoryVectorIndex {
    dimensions: usize,
    inner: Arc<RwLock<Store>>,
}

#[derive(Debug, Default)]
struct Store {
    vectors: Vec<IndexedVector>,
    positions: HashMap<Uuid, usize>,
}

impl InMemoryVectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            inner: Arc::new(RwLock::new(Store::default())),
        }
    }

    fn check_dimensions(&self, actual: usize) -> Result<(), DomainError> {
        if actual != self.dimensions {
            return Err(DomainError::index(
                self.provider_type(),
                format!(
                    "vector has {} dimensions, index expects {}",
                    actual, self.dimensions
                ),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn provider_type(&self) -> &'static str {
        "in_memory"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<usize, DomainError> {
        for vector in &vectors {
            self.check_dimensions(vector.dimensions())?;
        }

        let mut store = self.inner.write().await;
        let count = vectors.len();

        for vector in vectors {
            match store.positions.get(&vector.id).copied() {
                Some(pos) => store.vectors[pos] = vector,
                None => {
                    let pos = store.vectors.len();
                    store.positions.insert(vector.id, pos);
                    store.vectors.push(vector);
                }
            }
        }

        Ok(count)
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPassage>, DomainError> {
        self.check_dimensions(vector.len())?;

        let store = self.inner.read().await;

        let mut scored: Vec<(f32, &IndexedVector)> = store
            .vectors
            .iter()
            .map(|stored| (cosine_similarity(vector, &stored.vector), stored))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, stored)| {
                ScoredPassage::new(
                    stored.id.to_string(),
                    stored.text.clone(),
                    stored.metadata.clone(),
                    score,
                )
            })
            .collect())
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.inner.read().await.vectors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::ChunkMetadata;

    fn vector(id: Uuid, values: Vec<f32>, text: &str) -> IndexedVector {
        IndexedVector::new(id, values, text, ChunkMetadata::new("a.pdf", 0, 0))
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let index = InMemoryVectorIndex::new(2);
        index
            .upsert(vec![
                vector(Uuid::new_v4(), vec![0.0, 1.0], "north"),
                vector(Uuid::new_v4(), vec![1.0, 0.0], "east"),
                vector(Uuid::new_v4(), vec![0.7, 0.7], "north-east"),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.1], 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "east");
        assert_eq!(results[1].text, "north-east");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_ties_follow_insertion_order() {
        let index = InMemoryVectorIndex::new(2);
        index
            .upsert(vec![
                vector(Uuid::new_v4(), vec![1.0, 0.0], "first"),
                vector(Uuid::new_v4(), vec![2.0, 0.0], "second"),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).await.unwrap();

        assert_eq!(results[0].text, "first");
        assert_eq!(results[1].text, "second");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = InMemoryVectorIndex::new(2);
        let id = Uuid::new_v4();

        index.upsert(vec![vector(id, vec![1.0, 0.0], "old")]).await.unwrap();
        index.upsert(vec![vector(id, vec![1.0, 0.0], "new")]).await.unwrap();

        assert_eq!(index.count().await.unwrap(), 1);
        let results = index.search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(results[0].text, "new");
        assert_eq!(results[0].id, id.to_string());
    }

    #[tokio::test]
    async fn test_empty_index_returns_no_results() {
        let index = InMemoryVectorIndex::new(3);
        let results = index.search(&[0.1, 0.2, 0.3], 2).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let index = InMemoryVectorIndex::new(3);

        let err = index
            .upsert(vec![vector(Uuid::new_v4(), vec![1.0], "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::IndexService { .. }));
        assert_eq!(index.count().await.unwrap(), 0);

        assert!(index.search(&[1.0], 1).await.is_err());
    }

    #[test]
    fn test_blocking_count() {
        let index = InMemoryVectorIndex::new(2);
        let count = tokio_test::block_on(index.count()).unwrap();
        assert_eq!(count, 0);
        assert!(tokio_test::block_on(index.health_check()).unwrap());
    }
}
