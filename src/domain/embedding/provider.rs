//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Maps text into a fixed-dimension vector space
///
/// Ingestion and querying must go through the same provider and model so that
/// stored vectors and query vectors are comparable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate one embedding per input, in input order
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    fn provider_name(&self) -> &'static str;

    /// Model used when the caller has no preference
    fn default_model(&self) -> &str;

    /// Dimension of every vector this provider returns
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::embedding::Embedding;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic hash-based embeddings
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        returned_dimensions: Option<usize>,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                returned_dimensions: None,
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Advertise `dimensions` but return vectors of another size
        pub fn with_returned_dimensions(mut self, dimensions: usize) -> Self {
            self.returned_dimensions = Some(dimensions);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn vector_for(&self, text: &str) -> Vec<f32> {
            let dimensions = self.returned_dimensions.unwrap_or(self.dimensions);
            let hash = text
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

            (0..dimensions)
                .map(|i| ((hash.wrapping_add(i as u64 * 7919) % 1000) as f32 / 1000.0) - 0.5)
                .collect()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::embedding("mock", error));
            }

            let embeddings = request
                .inputs()
                .iter()
                .enumerate()
                .map(|(idx, text)| Embedding::new(idx, self.vector_for(text)))
                .collect();

            Ok(EmbeddingResponse::new(request.model(), embeddings))
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn default_model(&self) -> &str {
            "mock-embedding"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_batch_input() {
            let provider = MockEmbeddingProvider::new(768);
            let request =
                EmbeddingRequest::batch("mock-embedding", vec!["Hello".into(), "World".into()]);

            let response = provider.embed(request).await.unwrap();

            assert_eq!(response.len(), 2);
            assert!(response.ensure_dimensions(768).is_ok());
            assert_eq!(provider.call_count(), 1);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new(8).with_error("quota exceeded");
            let result = provider
                .embed(EmbeddingRequest::single("mock-embedding", "Hello"))
                .await;

            assert!(matches!(result, Err(DomainError::EmbeddingService { .. })));
        }

        #[tokio::test]
        async fn test_deterministic_embeddings() {
            let provider = MockEmbeddingProvider::new(16);
            let a = provider
                .embed(EmbeddingRequest::single("m", "Hello"))
                .await
                .unwrap();
            let b = provider
                .embed(EmbeddingRequest::single("m", "Hello"))
                .await
                .unwrap();

            assert_eq!(a.into_vectors(), b.into_vectors());
        }
    }
}
