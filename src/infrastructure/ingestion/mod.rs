//! Document ingestion infrastructure
//!
//! PDF/DOCX text extraction, the recursive chunker, and the pipeline that
//! embeds and indexes the resulting chunks.

pub mod chunkers;
pub mod extractors;
pub mod pipeline;

pub use chunkers::RecursiveChunker;
pub use extractors::{DocumentExtractor, DocxExtractor, PdfExtractor};
pub use pipeline::IngestionPipeline;
