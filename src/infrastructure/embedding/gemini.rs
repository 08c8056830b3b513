//! Gemini embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingTask,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
pub const EMBEDDING_001_DIMENSIONS: usize = 768;

/// Gemini embedding provider (`batchEmbedContents`)
#[derive(Debug)]
pub struct GeminiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

/// Gemini addresses models as `models/<name>`
pub(crate) fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

impl<C: HttpClientTrait> GeminiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GEMINI_BASE_URL)
    }

    pub fn with_base_url(client: C, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: EMBEDDING_001_DIMENSIONS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model_path(&model.into());
        self.dimensions = dimensions;
        self
    }

    fn embeddings_url(&self, model: &str) -> String {
        format!("{}/v1beta/{}:batchEmbedContents", self.base_url, model)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, model: &str, request: &EmbeddingRequest) -> serde_json::Value {
        let task = request.task().unwrap_or(EmbeddingTask::RetrievalDocument);

        let requests: Vec<serde_json::Value> = request
            .inputs()
            .into_iter()
            .map(|text| {
                json!({
                    "model": model,
                    "content": { "parts": [{ "text": text }] },
                    "taskType": task,
                })
            })
            .collect();

        json!({ "requests": requests })
    }

    fn parse_response(
        &self,
        model: &str,
        expected: usize,
        json: serde_json::Value,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: GeminiBatchEmbedResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::embedding("gemini", format!("Failed to parse embedding response: {}", e))
        })?;

        if response.embeddings.len() != expected {
            return Err(DomainError::embedding(
                "gemini",
                format!(
                    "Expected {} embeddings, received {}",
                    expected,
                    response.embeddings.len()
                ),
            ));
        }

        let embeddings = response
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(index, e)| Embedding::new(index, e.values))
            .collect();

        Ok(EmbeddingResponse::new(model, embeddings))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for GeminiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let expected = request.input().len();
        if request.input().is_empty() {
            return Ok(EmbeddingResponse::new(self.model.clone(), vec![]));
        }

        let model = model_path(request.model());
        let url = self.embeddings_url(&model);
        let body = self.build_request(&model, &request);

        tracing::debug!(model = %model, inputs = expected, "Requesting Gemini embeddings");

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| DomainError::embedding("gemini", e.to_string()))?;

        self.parse_response(&model, expected, response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// Gemini API types for embeddings

#[derive(Debug, Deserialize)]
struct GeminiBatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<GeminiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}
