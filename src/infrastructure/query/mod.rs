//! Retrieval-augmented query engine

mod engine;

pub use engine::QueryEngine;
