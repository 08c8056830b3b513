//! Domain layer - Core business logic and entities

pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod llm;
pub mod query;
pub mod vector_index;

pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingTask};
pub use error::{DomainError, ErrorCategory};
pub use ingestion::{
    Chunk, ChunkMetadata, ChunkingConfig, IngestionConfig, IngestionReport, SkippedDocument,
    SourceDocument, TextExtractor, TextUnit,
};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
pub use query::{QueryResult, RetrievedPassage, DEFAULT_TOP_K};
pub use vector_index::{IndexedVector, ScoredPassage, VectorIndex};
