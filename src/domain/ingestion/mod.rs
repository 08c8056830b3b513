//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `TextExtractor` trait for turning PDF/DOCX bytes into page-level text
//! - Chunk types and `ChunkingConfig`
//! - Configuration and report types for the ingestion pipeline

pub mod chunker;
pub mod extractor;
pub mod pipeline;
pub mod validation;

// Re-export main types
pub use chunker::{
    Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy, DEFAULT_CHUNK_OVERLAP,
    DEFAULT_CHUNK_SIZE,
};
pub use extractor::{DocumentFormat, TextExtractor, TextUnit};
pub use pipeline::{IngestionConfig, IngestionReport, SkippedDocument, SourceDocument};
pub use validation::{
    detect_format, validate_batch_size, validate_filename, MAX_EMBEDDING_BATCH_SIZE,
};

// Re-export mocks for testing
#[cfg(test)]
pub use extractor::mock::MockTextExtractor;
