use serde::Deserialize;

use crate::domain::ingestion::ChunkingConfig;
use crate::domain::query::DEFAULT_TOP_K;
use crate::domain::DomainError;
use crate::infrastructure::ingestion::extractors::DEFAULT_MAX_DOCUMENT_XML_BYTES;
use crate::infrastructure::observability::MetricsConfig;

pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub vector_index: VectorIndexSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum accepted upload body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_request_timeout() -> u64 {
    120
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    /// Largest inflated DOCX body accepted, in bytes
    #[serde(default = "default_max_document_xml_bytes")]
    pub max_document_xml_bytes: u64,
}

fn default_max_document_xml_bytes() -> u64 {
    DEFAULT_MAX_DOCUMENT_XML_BYTES
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_document_xml_bytes: default_max_document_xml_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Passages retrieved when a query does not specify `k`
    #[serde(default = "default_top_k")]
    pub default_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Maximum texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_embedding_model() -> String {
    "models/embedding-001".to_string()
}

fn default_dimensions() -> usize {
    768
}

fn default_batch_size() -> usize {
    100
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            base_url: default_gemini_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: 0.0,
            max_tokens: None,
            base_url: default_gemini_base_url(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorIndexBackend {
    #[default]
    Pinecone,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorIndexSettings {
    #[serde(default)]
    pub backend: VectorIndexBackend,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_cloud")]
    pub cloud: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,
    /// Delay between readiness checks while a new index is provisioned
    #[serde(default = "default_ready_poll_ms")]
    pub ready_poll_interval_ms: u64,
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

fn default_index_name() -> String {
    "basic-rag-system".to_string()
}

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_control_plane_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_ready_poll_ms() -> u64 {
    1000
}

fn default_ready_timeout() -> u64 {
    300
}

impl Default for VectorIndexSettings {
    fn default() -> Self {
        Self {
            backend: VectorIndexBackend::default(),
            index_name: default_index_name(),
            metric: default_metric(),
            cloud: default_cloud(),
            region: default_region(),
            control_plane_url: default_control_plane_url(),
            ready_poll_interval_ms: default_ready_poll_ms(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

/// API keys read from the environment, never from config files
#[derive(Clone, Default)]
pub struct Secrets {
    pub google_api_key: Option<String>,
    pub pinecone_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "***"))
            .field("pinecone_api_key", &self.pinecone_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            google_api_key: read(GOOGLE_API_KEY_VAR),
            pinecone_api_key: read(PINECONE_API_KEY_VAR),
        }
    }

    pub fn google_api_key(&self) -> Result<&str, DomainError> {
        self.google_api_key
            .as_deref()
            .ok_or_else(|| missing_key(GOOGLE_API_KEY_VAR))
    }

    pub fn pinecone_api_key(&self) -> Result<&str, DomainError> {
        self.pinecone_api_key
            .as_deref()
            .ok_or_else(|| missing_key(PINECONE_API_KEY_VAR))
    }
}

fn missing_key(name: &str) -> DomainError {
    DomainError::configuration(format!("Missing required API key. Ensure {} is set.", name))
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check internal consistency and that every key the selected backends need is present
    pub fn validate(&self, secrets: &Secrets) -> Result<(), DomainError> {
        self.chunking.validate()?;
        crate::domain::ingestion::validate_batch_size(self.embedding.batch_size)?;
        crate::domain::query::validate_top_k(self.retrieval.default_k)
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        if self.embedding.dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding.dimensions must be greater than 0",
            ));
        }

        if self.extraction.max_document_xml_bytes == 0 {
            return Err(DomainError::configuration(
                "extraction.max_document_xml_bytes must be greater than 0",
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(DomainError::configuration(
                "server.request_timeout_secs must be greater than 0",
            ));
        }

        secrets.google_api_key()?;

        if self.vector_index.backend == VectorIndexBackend::Pinecone {
            secrets.pinecone_api_key()?;
        }

        Ok(())
    }
}
