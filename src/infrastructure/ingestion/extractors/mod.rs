//! Text extractor implementations

mod docx;
mod pdf;
mod staging;

use std::panic::{catch_unwind, AssertUnwindSafe};

pub use docx::{DocxExtractor, DEFAULT_MAX_DOCUMENT_XML_BYTES};
pub use pdf::PdfExtractor;
pub use staging::StagedFile;

#[cfg(test)]
pub(crate) use docx::fixtures::docx_with_pages;
#[cfg(test)]
pub(crate) use pdf::fixtures::pdf_with_pages;

use crate::domain::ingestion::{detect_format, DocumentFormat, TextExtractor, TextUnit};
use crate::domain::DomainError;

/// Routes each upload to the extractor for its extension
#[derive(Debug, Default)]
pub struct DocumentExtractor {
    pdf: PdfExtractor,
    docx: DocxExtractor,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap how far a DOCX body may inflate during extraction
    pub fn with_max_document_xml_bytes(mut self, max_bytes: u64) -> Self {
        self.docx = self.docx.with_max_document_xml_bytes(max_bytes);
        self
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<Vec<TextUnit>, DomainError> {
        let format = detect_format(filename)?;

        let extractor: &dyn TextExtractor = match format {
            DocumentFormat::Pdf => &self.pdf,
            DocumentFormat::Docx => &self.docx,
        };

        // Third-party parsers may panic on hostile input
        catch_unwind(AssertUnwindSafe(|| extractor.extract(bytes, filename))).unwrap_or_else(|_| {
            Err(DomainError::extraction(
                filename,
                format!("{} parser aborted on malformed input", format),
            ))
        })
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf, DocumentFormat::Docx]
    }
}
