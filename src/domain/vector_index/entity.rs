//! Vector index entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ingestion::{Chunk, ChunkMetadata};

/// An embedded chunk ready to be written to the index
///
/// The id is generated once at ingestion and is the only link between a
/// chunk and its stored vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedVector {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl IndexedVector {
    pub fn new(id: Uuid, vector: Vec<f32>, text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            id,
            vector,
            text: text.into(),
            metadata,
        }
    }

    /// Pair a chunk with its vector under a fresh id
    pub fn from_chunk(chunk: Chunk, vector: Vec<f32>) -> Self {
        let metadata = chunk.metadata();
        Self::new(Uuid::new_v4(), vector, chunk.content, metadata)
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// A passage returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity, higher is closer
    pub score: f32,
}

impl ScoredPassage {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: ChunkMetadata, score: f32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chunk_assigns_fresh_ids() {
        let chunk = Chunk::new("hello", "a.pdf", 1, 4);
        let a = IndexedVector::from_chunk(chunk.clone(), vec![0.1, 0.2]);
        let b = IndexedVector::from_chunk(chunk, vec![0.1, 0.2]);

        assert_ne!(a.id, b.id);
        assert_eq!(a.text, "hello");
        assert_eq!(a.metadata, ChunkMetadata::new("a.pdf", 1, 4));
        assert_eq!(a.dimensions(), 2);
    }
}
