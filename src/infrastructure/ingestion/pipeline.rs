//! Ingestion pipeline service

use std::sync::Arc;
use std::time::Instant;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingTask};
use crate::domain::ingestion::{
    validate_filename, Chunk, ChunkingStrategy, IngestionConfig, IngestionReport, SkippedDocument,
    SourceDocument, TextExtractor, TextUnit,
};
use crate::domain::vector_index::{IndexedVector, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_gateway_call, record_ingestion};

/// Turns uploaded documents into indexed vectors
///
/// Each call extracts and chunks every document, embeds all chunks in slices
/// of `embedding_batch_size`, then writes the whole batch with a single upsert.
/// Documents that cannot be read are reported as skipped; everything after
/// extraction is all-or-nothing.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn ChunkingStrategy>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    embedding_model: String,
    config: IngestionConfig,
}

impl IngestionPipeline {
    /// Create a pipeline; the embedder and index must agree on dimension
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        chunker: Arc<dyn ChunkingStrategy>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: IngestionConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        if embedder.dimensions() != index.dimensions() {
            return Err(DomainError::configuration(format!(
                "Embedding dimension {} does not match index dimension {}",
                embedder.dimensions(),
                index.dimensions()
            )));
        }

        let embedding_model = embedder.default_model().to_string();

        Ok(Self {
            extractor,
            chunker,
            embedder,
            index,
            embedding_model,
            config,
        })
    }

    /// Override the embedding model sent with each request
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Ingest a batch of uploaded documents
    pub async fn ingest(&self, documents: Vec<SourceDocument>) -> Result<IngestionReport, DomainError> {
        let started = Instant::now();
        let result = self.run(documents).await;

        match &result {
            Ok(report) => {
                record_ingestion(
                    report.chunks_indexed,
                    report.documents_skipped(),
                    started.elapsed(),
                    true,
                );
                tracing::info!(
                    chunks_indexed = report.chunks_indexed,
                    documents_indexed = report.documents_indexed,
                    documents_skipped = report.documents_skipped(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Ingestion complete"
                );
            }
            Err(e) => {
                let skipped = match e {
                    DomainError::EmptyBatch { skipped } => skipped.len(),
                    _ => 0,
                };
                record_ingestion(0, skipped, started.elapsed(), false);
                tracing::error!(error = %e, "Ingestion failed");
            }
        }

        result
    }

    async fn run(&self, documents: Vec<SourceDocument>) -> Result<IngestionReport, DomainError> {
        let mut report = IngestionReport::new(documents.len());
        let mut chunks: Vec<Chunk> = Vec::new();

        for document in &documents {
            let units = match self.extract(document) {
                Ok(units) => units,
                Err(e) => {
                    tracing::warn!(filename = %document.filename, error = %e, "Skipping document");
                    report.skip(SkippedDocument::from_error(&document.filename, &e));
                    continue;
                }
            };

            let document_chunks = self.chunker.split(&units, &self.config.chunking)?;

            if document_chunks.is_empty() {
                tracing::warn!(filename = %document.filename, "Skipping document with no text");
                report.skip(SkippedDocument::no_content(&document.filename));
                continue;
            }

            tracing::debug!(
                filename = %document.filename,
                pages = units.len(),
                chunks = document_chunks.len(),
                "Document chunked"
            );

            report.documents_indexed += 1;
            chunks.extend(document_chunks);
        }

        if chunks.is_empty() {
            return Err(DomainError::EmptyBatch {
                skipped: report.skipped,
            });
        }

        let vectors = self.embed_chunks(&chunks).await.map_err(DomainError::indexing)?;

        let records: Vec<IndexedVector> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedVector::from_chunk(chunk, vector))
            .collect();
        let total = records.len();

        let started = Instant::now();
        let result = self.index.upsert(records).await;
        record_gateway_call(
            self.index.provider_type(),
            "upsert",
            started.elapsed(),
            result.is_ok(),
        );
        result.map_err(DomainError::indexing)?;

        report.chunks_indexed = total;
        Ok(report)
    }

    fn extract(&self, document: &SourceDocument) -> Result<Vec<TextUnit>, DomainError> {
        validate_filename(&document.filename)?;
        self.extractor.extract(&document.bytes, &document.filename)
    }

    /// Embed chunk texts in order, one vector per chunk
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, DomainError> {
        let expected_dimensions = self.index.dimensions();
        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.config.embedding_batch_size) {
            let texts = batch.iter().map(|c| c.content.clone()).collect();
            let request = EmbeddingRequest::batch(&self.embedding_model, texts)
                .with_task(EmbeddingTask::RetrievalDocument);

            let started = Instant::now();
            let result = self.embedder.embed(request).await;
            record_gateway_call(
                self.embedder.provider_name(),
                "embed",
                started.elapsed(),
                result.is_ok(),
            );
            let response = result?;

            if response.len() != batch.len() {
                return Err(DomainError::embedding(
                    self.embedder.provider_name(),
                    format!("expected {} embeddings, got {}", batch.len(), response.len()),
                ));
            }
            response.ensure_dimensions(expected_dimensions)?;

            vectors.extend(response.into_vectors());
        }

        Ok(vectors)
    }
}
