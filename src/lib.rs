//! PMP RAG Gateway
//!
//! Document ingestion and retrieval-augmented question answering:
//! - PDF/DOCX upload, page-level extraction and recursive chunking
//! - Gemini embeddings stored in a Pinecone (or in-memory) vector index
//! - Query answering with Gemini over the retrieved passages

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use config::Secrets;
use domain::embedding::EmbeddingProvider;
use domain::ingestion::IngestionConfig;
use domain::llm::LlmProvider;
use infrastructure::{
    embedding::GeminiEmbeddingProvider,
    http_client::HttpClient,
    ingestion::{DocumentExtractor, IngestionPipeline, RecursiveChunker},
    llm::GeminiProvider,
    query::QueryEngine,
    vector_index::VectorIndexFactory,
};
use tracing::info;

/// Wire the Gemini gateways, the vector index and both pipelines
pub async fn create_app_state(config: &AppConfig, secrets: &Secrets) -> anyhow::Result<AppState> {
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let client = HttpClient::with_timeout(request_timeout)?;
    let google_api_key = secrets.google_api_key()?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
        GeminiEmbeddingProvider::with_base_url(
            client.clone(),
            google_api_key,
            &config.embedding.base_url,
        )
            .with_model(&config.embedding.model, config.embedding.dimensions),
    );

    let llm: Arc<dyn LlmProvider> = Arc::new(
        GeminiProvider::with_base_url(client.clone(), google_api_key, &config.llm.base_url)
            .with_model(&config.llm.model),
    );

    info!(
        backend = ?config.vector_index.backend,
        index = %config.vector_index.index_name,
        "Connecting to vector index"
    );
    let vector_index = VectorIndexFactory::create(
        client,
        &config.vector_index,
        config.embedding.dimensions,
        secrets,
    )
    .await?;

    let ingestion = IngestionPipeline::new(
        Arc::new(
            DocumentExtractor::new()
                .with_max_document_xml_bytes(config.extraction.max_document_xml_bytes),
        ),
        Arc::new(RecursiveChunker::new()),
        embedder.clone(),
        vector_index.clone(),
        IngestionConfig {
            chunking: config.chunking.clone(),
            embedding_batch_size: config.embedding.batch_size,
        },
    )?;

    let query_engine = QueryEngine::new(embedder, vector_index.clone(), llm)
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens)
        .with_default_k(config.retrieval.default_k);

    info!(
        embedding_model = %config.embedding.model,
        llm_model = %config.llm.model,
        chunk_size = config.chunking.chunk_size,
        chunk_overlap = config.chunking.chunk_overlap,
        "Application state initialized"
    );

    Ok(AppState::new(ingestion, query_engine, vector_index, request_timeout))
}
