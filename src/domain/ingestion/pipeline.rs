//! Ingestion pipeline types and configuration

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chunker::ChunkingConfig;
use crate::domain::{DomainError, ErrorCategory};

/// A raw uploaded document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub bytes: Bytes,
    pub filename: String,
}

impl SourceDocument {
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }
}

/// Configuration for document ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Chunking configuration
    #[serde(flatten)]
    pub chunking: ChunkingConfig,
    /// Maximum number of texts per embedding request
    #[serde(default = "default_embedding_batch_size")]
    pub embedding_batch_size: usize,
}

fn default_embedding_batch_size() -> usize {
    100
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            embedding_batch_size: default_embedding_batch_size(),
        }
    }
}

impl IngestionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunking.chunk_size = size;
        self
    }

    pub fn with_chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunking.chunk_overlap = overlap;
        self
    }

    pub fn with_embedding_batch_size(mut self, batch_size: usize) -> Self {
        self.embedding_batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking.validate()?;
        super::validation::validate_batch_size(self.embedding_batch_size)
    }
}

/// A document that was left out of the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
    pub category: ErrorCategory,
}

impl SkippedDocument {
    /// Build from an extraction-stage error
    pub fn from_error(filename: impl Into<String>, error: &DomainError) -> Self {
        Self {
            filename: filename.into(),
            reason: error.to_string(),
            category: error.category(),
        }
    }

    /// The document extracted cleanly but yielded no chunkable text
    pub fn no_content(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reason: "Document contains no extractable text".to_string(),
            category: ErrorCategory::Extraction,
        }
    }
}

/// Outcome of one ingestion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionReport {
    pub chunks_indexed: usize,
    pub documents_received: usize,
    pub documents_indexed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDocument>,
    pub ingested_at: DateTime<Utc>,
}

impl IngestionReport {
    pub fn new(documents_received: usize) -> Self {
        Self {
            chunks_indexed: 0,
            documents_received,
            documents_indexed: 0,
            skipped: Vec::new(),
            ingested_at: Utc::now(),
        }
    }

    pub fn skip(&mut self, skipped: SkippedDocument) {
        self.skipped.push(skipped);
    }

    pub fn documents_skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Human-readable summary, matching the upload endpoint's message
    pub fn message(&self) -> String {
        format!(
            "Successfully uploaded and indexed {} document chunks.",
            self.chunks_indexed
        )
    }
}
