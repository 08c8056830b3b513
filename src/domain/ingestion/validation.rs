//! Validation helpers for ingestion

use crate::domain::DomainError;

use super::extractor::DocumentFormat;

/// Resolve the format of an upload or fail with `UnsupportedFormat`
pub fn detect_format(filename: &str) -> Result<DocumentFormat, DomainError> {
    DocumentFormat::from_filename(filename).ok_or_else(|| DomainError::unsupported_format(filename))
}

/// Validate an uploaded filename
pub fn validate_filename(filename: &str) -> Result<(), DomainError> {
    if filename.trim().is_empty() {
        return Err(DomainError::validation("Filename cannot be empty"));
    }

    if filename.len() > 255 {
        return Err(DomainError::validation(
            "Filename cannot exceed 255 characters",
        ));
    }

    Ok(())
}

/// Most texts a single `batchEmbedContents` call accepts
pub const MAX_EMBEDDING_BATCH_SIZE: usize = 100;

/// Validate embedding batch size
pub fn validate_batch_size(batch_size: usize) -> Result<(), DomainError> {
    if batch_size == 0 {
        return Err(DomainError::configuration("Batch size must be greater than 0"));
    }

    if batch_size > MAX_EMBEDDING_BATCH_SIZE {
        return Err(DomainError::configuration(format!(
            "Batch size cannot exceed {}",
            MAX_EMBEDDING_BATCH_SIZE
        )));
    }

    Ok(())
}
