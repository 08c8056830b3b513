//! DOCX text extraction

use std::io::Read;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::domain::ingestion::{DocumentFormat, TextExtractor, TextUnit};
use crate::domain::DomainError;

use super::staging::StagedFile;

const DOCUMENT_PART: &str = "word/document.xml";

/// Ceiling on the inflated size of `word/document.xml`
pub const DEFAULT_MAX_DOCUMENT_XML_BYTES: u64 = 64 * 1024 * 1024;

/// Extracts text from `word/document.xml`, one unit per explicit page break
#[derive(Debug, Clone)]
pub struct DocxExtractor {
    max_document_xml_bytes: u64,
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self {
            max_document_xml_bytes: DEFAULT_MAX_DOCUMENT_XML_BYTES,
        }
    }
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject documents whose body inflates past `max_bytes`
    pub fn with_max_document_xml_bytes(mut self, max_bytes: u64) -> Self {
        self.max_document_xml_bytes = max_bytes;
        self
    }

    /// Inflate the document body, never reading more than the configured ceiling
    fn read_document_xml<R: Read>(
        &self,
        entry: R,
        declared_size: u64,
        filename: &str,
    ) -> Result<String, DomainError> {
        let limit = self.max_document_xml_bytes;
        let too_large = || {
            DomainError::extraction(
                filename,
                format!("{} exceeds the {} byte extraction limit", DOCUMENT_PART, limit),
            )
        };

        if declared_size > limit {
            return Err(too_large());
        }

        // The declared size comes from the archive header and may be wrong
        let mut xml = String::new();
        entry
            .take(limit.saturating_add(1))
            .read_to_string(&mut xml)
            .map_err(|e| DomainError::extraction(filename, e.to_string()))?;

        if xml.len() as u64 > limit {
            return Err(too_large());
        }

        Ok(xml)
    }

    fn is_page_break(e: &BytesStart<'_>) -> bool {
        e.attributes()
            .flatten()
            .any(|attr| attr.key.local_name().as_ref() == b"type" && attr.value.as_ref() == b"page")
    }

    /// Walk the document body and return the text of each page
    fn pages_from_xml(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);

        let mut pages = Vec::new();
        let mut current = String::new();
        let mut in_text = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"t" => in_text = true,
                    b"br" if Self::is_page_break(&e) => pages.push(std::mem::take(&mut current)),
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" if Self::is_page_break(&e) => pages.push(std::mem::take(&mut current)),
                    b"br" | b"cr" => current.push('\n'),
                    _ => {}
                },
                Event::Text(e) if in_text => current.push_str(&e.unescape()?),
                Event::CData(e) if in_text => current.push_str(&String::from_utf8_lossy(&e)),
                Event::End(e) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" => current.push('\n'),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        pages.push(current);
        Ok(pages)
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8], filename: &str) -> Result<Vec<TextUnit>, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::extraction(filename, "Document is empty"));
        }

        let staged = StagedFile::write(bytes, filename, DocumentFormat::Docx)?;
        let file = staged
            .reopen()
            .map_err(|e| DomainError::extraction(filename, e.to_string()))?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| DomainError::extraction(filename, format!("Not a valid DOCX archive: {}", e)))?;

        let entry = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| DomainError::extraction(filename, format!("Missing {}: {}", DOCUMENT_PART, e)))?;
        let declared_size = entry.size();
        let xml = self.read_document_xml(entry, declared_size, filename)?;

        let pages = Self::pages_from_xml(&xml)
            .map_err(|e| DomainError::extraction(filename, format!("Malformed document XML: {}", e)))?;

        let units: Vec<TextUnit> = pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(page_index, text)| TextUnit::new(text, filename, page_index))
            .collect();

        if units.is_empty() {
            return Err(DomainError::extraction(filename, "DOCX contains no text"));
        }

        Ok(units)
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Docx]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;

    /// A DOCX archive holding `xml` as its deflated document body
    pub fn docx_from_xml(xml: &str) -> Vec<u8> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// A minimal DOCX whose pages are separated by explicit page breaks
    pub fn docx_with_pages(pages: &[&str]) -> Vec<u8> {
        let break_run = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;
        let body = pages
            .iter()
            .map(|text| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text))
            .collect::<Vec<_>>()
            .join(break_run);

        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        docx_from_xml(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_three_pages() {
        let bytes = fixtures::docx_with_pages(&["First page", "Second page", "Third page"]);

        let units = DocxExtractor::new().extract(&bytes, "memo.docx").unwrap();

        assert_eq!(units.len(), 3);
        assert_eq!(units[0].content, "First page\n");
        assert_eq!(units[2].page_index, 2);
        assert_eq!(units[1].source_id, "memo.docx");
    }

    #[test]
    fn test_runs_tabs_and_paragraphs() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve"> world &amp; more</w:t></w:r></w:p>
            <w:p><w:r><w:t>Next</w:t><w:br/><w:t>line</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let pages = DocxExtractor::pages_from_xml(xml).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], "Hello\t world & more\nNext\nline\n");
    }

    #[test]
    fn test_no_breaks_single_unit() {
        let bytes = fixtures::docx_with_pages(&["Only page"]);

        let units = DocxExtractor::new().extract(&bytes, "one.docx").unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].page_index, 0);
    }

    fn padded_body(padding: usize) -> String {
        format!(
            r#"<w:document xmlns:w="x"><w:body>{}<w:p><w:r><w:t>hi</w:t></w:r></w:p></w:body></w:document>"#,
            " ".repeat(padding)
        )
    }

    #[test]
    fn test_document_body_over_limit_is_rejected() {
        let bytes = fixtures::docx_from_xml(&padded_body(256 * 1024));
        assert!(bytes.len() < 16 * 1024);

        let extractor = DocxExtractor::new().with_max_document_xml_bytes(64 * 1024);
        let result = extractor.extract(&bytes, "bomb.docx");

        match result {
            Err(DomainError::Extraction { filename, message }) => {
                assert_eq!(filename, "bomb.docx");
                assert!(message.contains("exceeds"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_document_body_within_limit_is_read() {
        let bytes = fixtures::docx_from_xml(&padded_body(1024));

        let extractor = DocxExtractor::new().with_max_document_xml_bytes(64 * 1024);
        let units = extractor.extract(&bytes, "small.docx").unwrap();

        assert_eq!(units.len(), 1);
        assert!(units[0].content.contains("hi"));
    }

    #[test]
    fn test_read_is_bounded_when_declared_size_lies() {
        let xml = padded_body(8 * 1024);
        let extractor = DocxExtractor::new().with_max_document_xml_bytes(1024);

        let result = extractor.read_document_xml(xml.as_bytes(), 10, "liar.docx");

        assert!(matches!(result, Err(DomainError::Extraction { .. })));
    }

    #[test]
    fn test_not_a_zip() {
        let result = DocxExtractor::new().extract(b"plain text", "fake.docx");
        assert!(matches!(result, Err(DomainError::Extraction { .. })));
    }

    #[test]
    fn test_blank_document_is_extraction_error() {
        let bytes = fixtures::docx_with_pages(&["   "]);
        let result = DocxExtractor::new().extract(&bytes, "blank.docx");
        assert!(matches!(result, Err(DomainError::Extraction { .. })));
    }
}
