//! HTTP request and response types

pub mod documents;
pub mod error;
pub mod query;

pub use documents::UploadResponse;
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use query::{QueryParams, QueryResponse};
