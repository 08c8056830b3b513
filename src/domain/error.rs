use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ingestion::SkippedDocument;

/// Broad classification of a failure, used to decide who is at fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Caller supplied something unusable (4xx-equivalent)
    Input,
    /// A backend the core depends on failed (5xx-equivalent)
    Service,
    /// The document content itself could not be read
    Extraction,
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unsupported format: '{filename}' (only .pdf and .docx are accepted)")]
    UnsupportedFormat { filename: String },

    #[error("Extraction failed for '{filename}': {message}")]
    Extraction { filename: String, message: String },

    #[error("No chunks could be produced from the uploaded batch ({} document(s) skipped)", skipped.len())]
    EmptyBatch { skipped: Vec<SkippedDocument> },

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Embedding service error: {provider} - {message}")]
    EmbeddingService { provider: String, message: String },

    #[error("Index service error: {provider} - {message}")]
    IndexService { provider: String, message: String },

    #[error("Generation service error: {provider} - {message}")]
    GenerationService { provider: String, message: String },

    #[error("Indexing failed: {source}")]
    Indexing {
        #[source]
        source: Box<DomainError>,
    },

    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn unsupported_format(filename: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            filename: filename.into(),
        }
    }

    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingService {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn index(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IndexService {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GenerationService {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap a backend failure that happened while writing a batch to the index
    pub fn indexing(source: DomainError) -> Self {
        Self::Indexing {
            source: Box::new(source),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedFormat { .. }
            | Self::EmptyBatch { .. }
            | Self::EmptyQuery
            | Self::Validation { .. }
            | Self::Configuration { .. } => ErrorCategory::Input,
            Self::Extraction { .. } => ErrorCategory::Extraction,
            Self::EmbeddingService { .. }
            | Self::IndexService { .. }
            | Self::GenerationService { .. }
            | Self::Indexing { .. }
            | Self::Timeout { .. }
            | Self::Internal { .. } => ErrorCategory::Service,
        }
    }

    /// Short machine-readable code for API responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Extraction { .. } => "extraction_failed",
            Self::EmptyBatch { .. } => "empty_batch",
            Self::EmptyQuery => "empty_query",
            Self::Validation { .. } => "validation_error",
            Self::Configuration { .. } => "configuration_error",
            Self::EmbeddingService { .. } => "embedding_service_error",
            Self::IndexService { .. } => "index_service_error",
            Self::GenerationService { .. } => "generation_service_error",
            Self::Indexing { .. } => "indexing_failed",
            Self::Timeout { .. } => "timeout",
            Self::Internal { .. } => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_error() {
        let error = DomainError::unsupported_format("notes.txt");
        assert_eq!(
            error.to_string(),
            "Unsupported format: 'notes.txt' (only .pdf and .docx are accepted)"
        );
        assert_eq!(error.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_empty_query_error() {
        let error = DomainError::EmptyQuery;
        assert_eq!(error.to_string(), "Query cannot be empty");
        assert_eq!(error.code(), "empty_query");
    }

    #[test]
    fn test_indexing_wraps_source() {
        let error = DomainError::indexing(DomainError::index("pinecone", "HTTP 503"));
        assert_eq!(
            error.to_string(),
            "Indexing failed: Index service error: pinecone - HTTP 503"
        );
        assert_eq!(error.category(), ErrorCategory::Service);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_extraction_category() {
        let error = DomainError::extraction("broken.pdf", "invalid header");
        assert_eq!(error.category(), ErrorCategory::Extraction);
    }
}
