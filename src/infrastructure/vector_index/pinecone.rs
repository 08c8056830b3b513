//! Pinecone vector index over the REST API

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::ingestion::ChunkMetadata;
use crate::domain::vector_index::{IndexedVector, ScoredPassage, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClientTrait, HttpError};

const API_VERSION: &str = "2024-07";
/// Metadata key holding the chunk text
const TEXT_KEY: &str = "text";
/// Vectors per upsert request, well under Pinecone's 2MB request limit
const UPSERT_BATCH_SIZE: usize = 100;

/// Settings for locating or creating a Pinecone index
#[derive(Debug, Clone)]
pub struct PineconeOptions {
    pub index_name: String,
    pub dimensions: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub control_plane_url: String,
    pub ready_poll_interval: Duration,
    pub ready_timeout: Duration,
}

impl Default for PineconeOptions {
    fn default() -> Self {
        Self {
            index_name: "basic-rag-system".to_string(),
            dimensions: 768,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            ready_poll_interval: Duration::from_secs(1),
            ready_timeout: Duration::from_secs(300),
        }
    }
}

/// Pinecone serverless index
#[derive(Debug)]
pub struct PineconeVectorIndex<C: HttpClientTrait> {
    client: C,
    api_key: String,
    host: String,
    dimensions: usize,
}

fn index_error(e: HttpError) -> DomainError {
    DomainError::index("pinecone", e.to_string())
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

impl<C: HttpClientTrait> PineconeVectorIndex<C> {
    /// Use an index whose data-plane host is already known
    pub fn new(client: C, api_key: impl Into<String>, host: &str, dimensions: usize) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            host: normalize_host(host),
            dimensions,
        }
    }

    /// Find the configured index, creating it and waiting for readiness if absent
    pub async fn connect(
        client: C,
        api_key: impl Into<String>,
        options: &PineconeOptions,
    ) -> Result<Self, DomainError> {
        let api_key = api_key.into();
        let control = ControlPlane {
            client: &client,
            api_key: &api_key,
            base_url: options.control_plane_url.trim_end_matches('/'),
        };

        let existing = control.list_indexes().await?;

        let description = match existing.into_iter().find(|i| i.name == options.index_name) {
            Some(index) => {
                if let Some(dimension) = index.dimension {
                    if dimension != options.dimensions {
                        return Err(DomainError::configuration(format!(
                            "Pinecone index '{}' has dimension {}, expected {}",
                            options.index_name, dimension, options.dimensions
                        )));
                    }
                }
                tracing::info!(index = %options.index_name, "Using existing Pinecone index");
                index
            }
            None => {
                tracing::info!(
                    index = %options.index_name,
                    dimension = options.dimensions,
                    metric = %options.metric,
                    "Creating Pinecone index"
                );
                control.create_index(options).await?
            }
        };

        let description = if description.is_ready() {
            description
        } else {
            control.wait_until_ready(options).await?
        };

        let host = description.host.ok_or_else(|| {
            DomainError::index("pinecone", format!("Index '{}' has no host", options.index_name))
        })?;

        Ok(Self::new(client, api_key, &host, options.dimensions))
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Api-Key", self.api_key.as_str()),
            ("X-Pinecone-API-Version", API_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn to_record(vector: &IndexedVector) -> serde_json::Value {
        let mut metadata = vector.metadata.to_json_map();
        metadata.insert(TEXT_KEY.to_string(), json!(vector.text));

        json!({
            "id": vector.id.to_string(),
            "values": vector.vector,
            "metadata": metadata,
        })
    }

    fn from_match(m: PineconeMatch) -> ScoredPassage {
        let text = m
            .metadata
            .get(TEXT_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        ScoredPassage::new(m.id, text, ChunkMetadata::from_json_map(&m.metadata), m.score)
    }

    async fn describe_stats(&self) -> Result<IndexStats, DomainError> {
        let response = self
            .client
            .post_json(
                &format!("{}/describe_index_stats", self.host),
                self.headers(),
                &json!({}),
            )
            .await
            .map_err(index_error)?;

        serde_json::from_value(response)
            .map_err(|e| DomainError::index("pinecone", format!("Failed to parse stats: {}", e)))
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorIndex for PineconeVectorIndex<C> {
    fn provider_type(&self) -> &'static str {
        "pinecone"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn upsert(&self, vectors: Vec<IndexedVector>) -> Result<usize, DomainError> {
        if let Some(bad) = vectors.iter().find(|v| v.dimensions() != self.dimensions) {
            return Err(DomainError::index(
                "pinecone",
                format!(
                    "vector {} has {} dimensions, index expects {}",
                    bad.id,
                    bad.dimensions(),
                    self.dimensions
                ),
            ));
        }

        let url = format!("{}/vectors/upsert", self.host);
        let mut upserted = 0;

        for batch in vectors.chunks(UPSERT_BATCH_SIZE) {
            let records: Vec<serde_json::Value> = batch.iter().map(Self::to_record).collect();

            let response = self
                .client
                .post_json(&url, self.headers(), &json!({ "vectors": records }))
                .await
                .map_err(index_error)?;

            upserted += response
                .get("upsertedCount")
                .and_then(|v| v.as_u64())
                .map(|n| n as usize)
                .unwrap_or(batch.len());
        }

        tracing::debug!(upserted, "Upserted vectors to Pinecone");
        Ok(upserted)
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPassage>, DomainError> {
        if vector.len() != self.dimensions {
            return Err(DomainError::index(
                "pinecone",
                format!(
                    "query vector has {} dimensions, index expects {}",
                    vector.len(),
                    self.dimensions
                ),
            ));
        }

        let body = json!({
            "vector": vector,
            "topK": k,
            "includeMetadata": true,
            "includeValues": false,
        });

        let response = self
            .client
            .post_json(&format!("{}/query", self.host), self.headers(), &body)
            .await
            .map_err(index_error)?;

        let response: PineconeQueryResponse = serde_json::from_value(response)
            .map_err(|e| DomainError::index("pinecone", format!("Failed to parse query response: {}", e)))?;

        Ok(response.matches.into_iter().map(Self::from_match).collect())
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        self.describe_stats().await.map(|_| true)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.describe_stats().await?.total_vector_count)
    }
}

/// Pinecone management API
struct ControlPlane<'a, C: HttpClientTrait> {
    client: &'a C,
    api_key: &'a str,
    base_url: &'a str,
}

impl<C: HttpClientTrait> ControlPlane<'_, C> {
    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Api-Key", self.api_key),
            ("X-Pinecone-API-Version", API_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>, DomainError> {
        let response = self
            .client
            .get_json(&format!("{}/indexes", self.base_url), self.headers())
            .await
            .map_err(index_error)?;

        let list: IndexList = serde_json::from_value(response)
            .map_err(|e| DomainError::index("pinecone", format!("Failed to parse index list: {}", e)))?;

        Ok(list.indexes)
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription, DomainError> {
        let response = self
            .client
            .get_json(&format!("{}/indexes/{}", self.base_url, name), self.headers())
            .await
            .map_err(index_error)?;

        serde_json::from_value(response)
            .map_err(|e| DomainError::index("pinecone", format!("Failed to parse index: {}", e)))
    }

    async fn create_index(&self, options: &PineconeOptions) -> Result<IndexDescription, DomainError> {
        let body = json!({
            "name": options.index_name,
            "dimension": options.dimensions,
            "metric": options.metric,
            "spec": {
                "serverless": {
                    "cloud": options.cloud,
                    "region": options.region,
                }
            }
        });

        let result = self
            .client
            .post_json(&format!("{}/indexes", self.base_url), self.headers(), &body)
            .await;

        match result {
            Ok(response) => serde_json::from_value(response).map_err(|e| {
                DomainError::index("pinecone", format!("Failed to parse created index: {}", e))
            }),
            // Another instance created it first
            Err(e) if e.status() == Some(409) => self.describe_index(&options.index_name).await,
            Err(e) => Err(index_error(e)),
        }
    }

    async fn wait_until_ready(&self, options: &PineconeOptions) -> Result<IndexDescription, DomainError> {
        let started = Instant::now();

        loop {
            let description = self.describe_index(&options.index_name).await?;
            if description.is_ready() {
                tracing::info!(
                    index = %options.index_name,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Pinecone index ready"
                );
                return Ok(description);
            }

            if started.elapsed() >= options.ready_timeout {
                return Err(DomainError::index(
                    "pinecone",
                    format!(
                        "Index '{}' not ready after {}s",
                        options.index_name,
                        options.ready_timeout.as_secs()
                    ),
                ));
            }

            tracing::debug!(index = %options.index_name, "Waiting for Pinecone index");
            tokio::time::sleep(options.ready_poll_interval).await;
        }
    }
}

// Pinecone API types

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    dimension: Option<usize>,
    host: Option<String>,
    status: Option<IndexStatus>,
}

impl IndexDescription {
    fn is_ready(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.ready) && self.host.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    total_vector_count: usize,
}

#[derive(Debug, Deserialize)]
struct PineconeQueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}
