//! Vector index implementations

mod factory;
mod in_memory;
mod pinecone;

pub use factory::VectorIndexFactory;
pub use in_memory::InMemoryVectorIndex;
pub use pinecone::{PineconeOptions, PineconeVectorIndex};
