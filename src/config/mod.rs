mod app_config;

pub use app_config::{
    AppConfig, EmbeddingSettings, LlmSettings, LogFormat, LoggingConfig, RetrievalConfig,
    Secrets, ServerConfig, VectorIndexBackend, VectorIndexSettings, GOOGLE_API_KEY_VAR,
    PINECONE_API_KEY_VAR,
};
