//! Retrieval-augmented query domain

mod prompt;
mod result;

pub use prompt::build_prompt;
pub use result::{
    validate_query, validate_top_k, QueryResult, RetrievedPassage, DEFAULT_TOP_K, MAX_TOP_K,
};
