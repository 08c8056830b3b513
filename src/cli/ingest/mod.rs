//! Ingest command - index local files without running the server

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::domain::ingestion::SourceDocument;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// PDF or DOCX files to index
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let (config, secrets) = super::bootstrap()?;
    let state = crate::create_app_state(&config, &secrets).await?;

    let documents = read_documents(&args.files).await?;
    info!(files = documents.len(), "Ingesting local documents");

    let report = state.ingestion.ingest(documents).await?;

    println!("{}", report.message());
    for skipped in &report.skipped {
        println!("skipped {}: {}", skipped.filename, skipped.reason);
    }

    Ok(())
}

async fn read_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<SourceDocument>> {
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        documents.push(SourceDocument::new(bytes, filename));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_documents_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let documents = read_documents(&[path]).await.unwrap();

        assert_eq!(documents[0].filename, "manual.pdf");
        assert_eq!(&documents[0].bytes[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_read_documents_missing_file() {
        let result = read_documents(&[PathBuf::from("/nonexistent/file.pdf")]).await;
        assert!(result.is_err());
    }
}
