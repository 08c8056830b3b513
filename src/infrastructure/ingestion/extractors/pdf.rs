//! PDF text extraction

use crate::domain::ingestion::{DocumentFormat, TextExtractor, TextUnit};
use crate::domain::DomainError;

use super::staging::StagedFile;

/// Extracts one text unit per PDF page using `lopdf`
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<Vec<TextUnit>, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::extraction(filename, "Document is empty"));
        }

        let staged = StagedFile::write(bytes, filename, DocumentFormat::Pdf)?;

        let document = lopdf::Document::load(staged.path())
            .map_err(|e| DomainError::extraction(filename, format!("Failed to load PDF: {}", e)))?;

        let mut units = Vec::new();

        for (page_index, page_number) in document.get_pages().into_keys().enumerate() {
            match document.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => {
                    units.push(TextUnit::new(text, filename, page_index));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(filename, page_number, error = %e, "Could not extract page text");
                }
            }
        }

        if units.is_empty() {
            return Err(DomainError::extraction(
                filename,
                "PDF has no extractable text (it may be image-based or encrypted)",
            ));
        }

        Ok(units)
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf]
    }
}
