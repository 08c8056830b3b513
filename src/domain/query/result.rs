//! Query results

use serde::{Deserialize, Serialize};

use crate::domain::ingestion::ChunkMetadata;
use crate::domain::vector_index::ScoredPassage;
use crate::domain::DomainError;

/// Number of passages retrieved when the caller does not say
pub const DEFAULT_TOP_K: usize = 2;

/// Upper bound on `k`, to keep prompts bounded
pub const MAX_TOP_K: usize = 50;

/// A retrieved passage as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub score: f32,
}

impl From<ScoredPassage> for RetrievedPassage {
    fn from(passage: ScoredPassage) -> Self {
        Self {
            text: passage.text,
            metadata: passage.metadata,
            score: passage.score,
        }
    }
}

/// Passages used as context plus the generated answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub chunks: Vec<RetrievedPassage>,
    pub answer: String,
}

/// Reject blank queries before any backend is touched
pub fn validate_query(query: &str) -> Result<&str, DomainError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyQuery);
    }
    Ok(trimmed)
}

pub fn validate_top_k(k: usize) -> Result<(), DomainError> {
    if k == 0 {
        return Err(DomainError::validation("k must be at least 1"));
    }

    if k > MAX_TOP_K {
        return Err(DomainError::validation(format!(
            "k cannot exceed {}",
            MAX_TOP_K
        )));
    }

    Ok(())
}
