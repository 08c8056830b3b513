//! Chunk types and chunking configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use super::extractor::TextUnit;
use crate::domain::DomainError;

pub const DEFAULT_CHUNK_SIZE: usize = 700;
pub const DEFAULT_CHUNK_OVERLAP: usize = 40;

/// Configuration for chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::configuration("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::configuration(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }

    /// Largest piece that still fits in a chunk after the overlap prefix
    pub fn piece_capacity(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

/// Where a chunk came from; stored alongside its vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_id: String,
    pub page_index: usize,
    pub chunk_index: usize,
}

impl ChunkMetadata {
    pub fn new(source_id: impl Into<String>, page_index: usize, chunk_index: usize) -> Self {
        Self {
            source_id: source_id.into(),
            page_index,
            chunk_index,
        }
    }

    /// Convert to JSON value map
    pub fn to_json_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "source_id".to_string(),
            serde_json::Value::String(self.source_id.clone()),
        );
        map.insert(
            "page_index".to_string(),
            serde_json::Value::Number(self.page_index.into()),
        );
        map.insert(
            "chunk_index".to_string(),
            serde_json::Value::Number(self.chunk_index.into()),
        );
        map
    }

    /// Rebuild from a JSON value map, tolerating missing keys
    pub fn from_json_map(map: &HashMap<String, serde_json::Value>) -> Self {
        let as_index = |key: &str| {
            map.get(key)
                .and_then(|v| v.as_f64())
                .map(|n| n as usize)
                .unwrap_or_default()
        };

        Self {
            source_id: map
                .get("source_id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            page_index: as_index("page_index"),
            chunk_index: as_index("chunk_index"),
        }
    }
}

/// A bounded passage carved from one text unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub source_id: String,
    pub page_index: usize,
    /// Dense, in emission order within a document
    pub chunk_index: usize,
}

impl Chunk {
    pub fn new(
        content: impl Into<String>,
        source_id: impl Into<String>,
        page_index: usize,
        chunk_index: usize,
    ) -> Self {
        Self {
            content: content.into(),
            source_id: source_id.into(),
            page_index,
            chunk_index,
        }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata::new(&self.source_id, self.page_index, self.chunk_index)
    }
}

/// Splits page-level text into bounded, overlapping chunks
///
/// Implementations are pure: the same units and configuration always yield
/// the same chunks. Chunks never span two units.
pub trait ChunkingStrategy: Send + Sync + Debug {
    fn split(&self, units: &[TextUnit], config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError>;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunking_config_default() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 700);
        assert_eq!(config.chunk_overlap, 40);
        assert_eq!(config.piece_capacity(), 660);
    }

    #[test]
    fn test_chunking_config_validation() {
        assert!(ChunkingConfig::new(100, 50).validate().is_ok());

        let invalid = ChunkingConfig::new(0, 0);
        assert!(matches!(
            invalid.validate(),
            Err(DomainError::Configuration { .. })
        ));

        let invalid = ChunkingConfig::new(100, 100);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_chunking_config_deserialize_defaults() {
        let config: ChunkingConfig = serde_json::from_str(r#"{"chunk_size": 500}"#).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 40);
    }

    #[test]
    fn test_chunk_metadata_json_roundtrip() {
        let meta = ChunkMetadata::new("guide.pdf", 3, 12);
        let map = meta.to_json_map();

        assert_eq!(
            map.get("chunk_index"),
            Some(&serde_json::Value::Number(12.into()))
        );
        assert_eq!(ChunkMetadata::from_json_map(&map), meta);
    }

    #[test]
    fn test_chunk_metadata_from_float_indices() {
        // Pinecone returns numeric metadata as floats
        let mut map = HashMap::new();
        map.insert("source_id".to_string(), serde_json::json!("a.docx"));
        map.insert("page_index".to_string(), serde_json::json!(2.0));

        let meta = ChunkMetadata::from_json_map(&map);
        assert_eq!(meta.page_index, 2);
        assert_eq!(meta.chunk_index, 0);
    }

    #[test]
    fn test_chunk_char_len_counts_scalars() {
        let chunk = Chunk::new("naïve", "a.pdf", 0, 0);
        assert_eq!(chunk.char_len(), 5);
        assert_eq!(chunk.metadata().source_id, "a.pdf");
    }
}
