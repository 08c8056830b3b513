//! Text extractor trait and page-level text units

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Document formats accepted for ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a filename extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;

        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// One page (or section) of extracted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub content: String,
    pub source_id: String,
    pub page_index: usize,
}

impl TextUnit {
    pub fn new(content: impl Into<String>, source_id: impl Into<String>, page_index: usize) -> Self {
        Self {
            content: content.into(),
            source_id: source_id.into(),
            page_index,
        }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Converts raw document bytes into ordered page-level text
///
/// Extraction is synchronous: it never suspends and never calls out to a
/// remote service. Implementations must release any transient resource they
/// acquire on every exit path.
pub trait TextExtractor: Send + Sync + Debug {
    /// Extract text units from `bytes`, using `filename` as the source id and
    /// to determine the format.
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<Vec<TextUnit>, DomainError>;

    /// Formats this extractor can handle
    fn supported_formats(&self) -> &[DocumentFormat];

    /// Check if this extractor supports a given filename
    fn supports_file(&self, filename: &str) -> bool {
        DocumentFormat::from_filename(filename)
            .map(|format| self.supported_formats().contains(&format))
            .unwrap_or(false)
    }
}
