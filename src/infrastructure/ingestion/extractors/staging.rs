//! Scoped on-disk staging for uploaded bytes

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::ingestion::DocumentFormat;
use crate::domain::DomainError;

/// An upload written to a temporary file that is removed on drop
///
/// The file keeps the document's extension as its suffix. Removal happens on
/// every exit path, including unwinding and future cancellation.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn write(bytes: &[u8], filename: &str, format: DocumentFormat) -> Result<Self, DomainError> {
        let suffix = format!(".{}", format.extension());

        let mut file = tempfile::Builder::new()
            .prefix("rag-upload-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| DomainError::extraction(filename, format!("Failed to stage upload: {}", e)))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| DomainError::extraction(filename, format!("Failed to stage upload: {}", e)))?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reopen the staged file for reading
    pub fn reopen(&self) -> std::io::Result<std::fs::File> {
        self.file.reopen()
    }
}
