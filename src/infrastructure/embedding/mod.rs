//! Embedding provider implementations

mod gemini;

pub use gemini::{
    GeminiEmbeddingProvider, DEFAULT_EMBEDDING_MODEL, DEFAULT_GEMINI_BASE_URL,
    EMBEDDING_001_DIMENSIONS,
};
pub(crate) use gemini::model_path;
