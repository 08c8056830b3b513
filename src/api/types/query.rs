use serde::{Deserialize, Serialize};

use crate::domain::query::RetrievedPassage;

/// `GET /query` parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub query: String,
    pub k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
    pub passages: Vec<RetrievedPassage>,
}
