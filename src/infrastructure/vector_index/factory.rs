//! Vector index factory

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Secrets, VectorIndexBackend, VectorIndexSettings};
use crate::domain::vector_index::VectorIndex;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

use super::in_memory::InMemoryVectorIndex;
use super::pinecone::{PineconeOptions, PineconeVectorIndex};

/// Builds the configured vector index backend
#[derive(Debug)]
pub struct VectorIndexFactory;

impl VectorIndexFactory {
    /// Create the backend named in `settings`, bootstrapping Pinecone if needed
    pub async fn create<C: HttpClientTrait + 'static>(
        client: C,
        settings: &VectorIndexSettings,
        dimensions: usize,
        secrets: &Secrets,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        match settings.backend {
            VectorIndexBackend::Memory => {
                tracing::warn!("Using in-memory vector index; data is lost on restart");
                Ok(Arc::new(InMemoryVectorIndex::new(dimensions)))
            }
            VectorIndexBackend::Pinecone => {
                let options = PineconeOptions::from_settings(settings, dimensions);
                let index =
                    PineconeVectorIndex::connect(client, secrets.pinecone_api_key()?, &options)
                        .await?;
                Ok(Arc::new(index))
            }
        }
    }
}

impl PineconeOptions {
    pub fn from_settings(settings: &VectorIndexSettings, dimensions: usize) -> Self {
        Self {
            index_name: settings.index_name.clone(),
            dimensions,
            metric: settings.metric.clone(),
            cloud: settings.cloud.clone(),
            region: settings.region.clone(),
            control_plane_url: settings.control_plane_url.clone(),
            ready_poll_interval: Duration::from_millis(settings.ready_poll_interval_ms),
            ready_timeout: Duration::from_secs(settings.ready_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    fn settings(backend: VectorIndexBackend) -> VectorIndexSettings {
        VectorIndexSettings {
            backend,
            ..VectorIndexSettings::default()
        }
    }

    #[tokio::test]
    async fn test_memory_backend_needs_no_key() {
        let index = VectorIndexFactory::create(
            MockHttpClient::new(),
            &settings(VectorIndexBackend::Memory),
            768,
            &Secrets::default(),
        )
        .await
        .unwrap();

        assert_eq!(index.provider_type(), "in_memory");
        assert_eq!(index.dimensions(), 768);
    }

    #[tokio::test]
    async fn test_pinecone_backend_requires_key() {
        let err = VectorIndexFactory::create(
            MockHttpClient::new(),
            &settings(VectorIndexBackend::Pinecone),
            768,
            &Secrets::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_pinecone_backend_connects() {
        let client = MockHttpClient::new().with_response(
            "https://api.pinecone.io/indexes",
            json!({ "indexes": [{
                "name": "basic-rag-system",
                "dimension": 768,
                "host": "basic-rag-system-x.svc.pinecone.io",
                "status": { "ready": true }
            }] }),
        );
        let secrets = Secrets {
            google_api_key: Some("g".to_string()),
            pinecone_api_key: Some("p".to_string()),
        };

        let index = VectorIndexFactory::create(
            client,
            &settings(VectorIndexBackend::Pinecone),
            768,
            &secrets,
        )
        .await
        .unwrap();

        assert_eq!(index.provider_type(), "pinecone");
    }

    #[test]
    fn test_options_from_settings() {
        let options = PineconeOptions::from_settings(&VectorIndexSettings::default(), 768);

        assert_eq!(options.index_name, "basic-rag-system");
        assert_eq!(options.metric, "cosine");
        assert_eq!(options.ready_poll_interval, Duration::from_millis(1000));
        assert_eq!(options.ready_timeout, Duration::from_secs(300));
    }
}
