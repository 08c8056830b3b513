//! Vector index domain types and traits

mod entity;
mod provider;

pub use entity::{IndexedVector, ScoredPassage};
pub use provider::VectorIndex;

#[cfg(test)]
pub use provider::MockVectorIndex;
