use std::sync::Arc;
use std::time::Instant;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingTask};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::query::{
    build_prompt, validate_query, validate_top_k, QueryResult, RetrievedPassage, DEFAULT_TOP_K,
};
use crate::domain::vector_index::{ScoredPassage, VectorIndex};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_gateway_call, record_query};

/// Answers questions from indexed passages
///
/// The flow is embed query -> nearest-neighbour search -> prompt -> LLM. An
/// empty search result still reaches the LLM, which is told no passages were
/// found and answers from general knowledge.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    embedding_model: String,
    llm_model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    default_k: usize,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let embedding_model = embedder.default_model().to_string();
        let llm_model = llm.default_model().to_string();

        Self {
            embedder,
            index,
            llm,
            embedding_model,
            llm_model,
            temperature: 0.0,
            max_tokens: None,
            default_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_llm_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_default_k(mut self, k: usize) -> Self {
        self.default_k = k;
        self
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    /// Answer text only
    pub async fn answer(&self, query: &str, k: Option<usize>) -> Result<String, DomainError> {
        self.query(query, k).await.map(|result| result.answer)
    }

    /// Answer plus the passages it was grounded on
    pub async fn query(&self, query: &str, k: Option<usize>) -> Result<QueryResult, DomainError> {
        let query = validate_query(query)?;
        let k = k.unwrap_or(self.default_k);
        validate_top_k(k)?;

        let started = Instant::now();
        let result = self.run(query, k).await;

        match &result {
            Ok(result) => {
                record_query(result.chunks.len(), started.elapsed(), true);
                tracing::info!(
                    k,
                    passages = result.chunks.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Query answered"
                );
            }
            Err(e) => {
                record_query(0, started.elapsed(), false);
                tracing::error!(error = %e, "Query failed");
            }
        }

        result
    }

    async fn run(&self, query: &str, k: usize) -> Result<QueryResult, DomainError> {
        let vector = self.embed_query(query).await?;

        let started = Instant::now();
        let search = self.index.search(&vector, k).await;
        record_gateway_call(
            self.index.provider_type(),
            "search",
            started.elapsed(),
            search.is_ok(),
        );
        let passages: Vec<ScoredPassage> = search?;

        if passages.is_empty() {
            tracing::debug!("No passages retrieved, answering without context");
        }

        let prompt = build_prompt(query, &passages);
        let mut builder = LlmRequest::builder().user(prompt).temperature(self.temperature);
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        let started = Instant::now();
        let response = self.llm.chat(&self.llm_model, builder.build()).await;
        record_gateway_call(
            self.llm.provider_name(),
            "generate",
            started.elapsed(),
            response.is_ok(),
        );

        Ok(QueryResult {
            chunks: passages.into_iter().map(RetrievedPassage::from).collect(),
            answer: response?.into_content(),
        })
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(&self.embedding_model, query)
            .with_task(EmbeddingTask::RetrievalQuery);

        let started = Instant::now();
        let result = self.embedder.embed(request).await;
        record_gateway_call(
            self.embedder.provider_name(),
            "embed",
            started.elapsed(),
            result.is_ok(),
        );

        let response = result?;
        response.ensure_dimensions(self.index.dimensions())?;

        response.into_vectors().into_iter().next().ok_or_else(|| {
            DomainError::embedding(self.embedder.provider_name(), "No embedding returned for query")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::ingestion::{Chunk, ChunkMetadata};
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::vector_index::{IndexedVector, MockVectorIndex};
    use crate::domain::ErrorCategory;
    use crate::infrastructure::vector_index::InMemoryVectorIndex;

    const DIMS: usize = 8;

    fn engine(
        embedder: Arc<MockEmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<MockLlmProvider>,
    ) -> QueryEngine {
        QueryEngine::new(embedder, index, llm)
    }

    async fn seeded_index(embedder: &MockEmbeddingProvider, texts: &[&str]) -> Arc<InMemoryVectorIndex> {
        let index = Arc::new(InMemoryVectorIndex::new(DIMS));
        let vectors = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                IndexedVector::from_chunk(Chunk::new(*text, "policy.pdf", i, 0), embedder.vector_for(text))
            })
            .collect();
        index.upsert(vectors).await.unwrap();
        index
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_any_call() {
        let embedder = Arc::new(MockEmbeddingProvider::new(DIMS));
        let llm = Arc::new(MockLlmProvider::new().with_response("unused"));
        let mut index = MockVectorIndex::new();
        index.expect_search().never();

        let engine = engine(embedder.clone(), Arc::new(index), llm.clone());

        for query in ["", "   ", "\n\t"] {
            let err = engine.answer(query, None).await.unwrap_err();
            assert!(matches!(err, DomainError::EmptyQuery));
            assert_eq!(err.category(), ErrorCategory::Input);
        }

        assert_eq!(embedder.call_count(), 0);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_zero_k_is_validation_error() {
        let embedder = Arc::new(MockEmbeddingProvider::new(DIMS));
        let engine = engine(
            embedder.clone(),
            Arc::new(InMemoryVectorIndex::new(DIMS)),
            Arc::new(MockLlmProvider::new().with_response("unused")),
        );

        let err = engine.answer("hello", Some(0)).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_index_still_answers() {
        let llm = Arc::new(MockLlmProvider::new().with_response("Hello! How can I help?"));
        let engine = engine(
            Arc::new(MockEmbeddingProvider::new(DIMS)),
            Arc::new(InMemoryVectorIndex::new(DIMS)),
            llm.clone(),
        );

        let answer = engine.answer("hello", Some(2)).await.unwrap();

        assert_eq!(answer, "Hello! How can I help?");
        let prompt = llm.requests()[0].messages[0].content.clone();
        assert!(prompt.contains("No relevant passages were found"));
    }

    #[tokio::test]
    async fn test_prompt_carries_passages_at_zero_temperature() {
        let embedder = Arc::new(MockEmbeddingProvider::new(DIMS));
        let index = seeded_index(
            &embedder,
            &["Refunds are issued within 5 days.", "Support is open 9 to 5.", "Shipping is free."],
        )
        .await;
        let llm = Arc::new(MockLlmProvider::new().with_response("Within 5 days."));
        let engine = engine(embedder.clone(), index, llm.clone());

        let result = engine
            .query("  Refunds are issued within 5 days.  ", None)
            .await
            .unwrap();

        assert_eq!(result.answer, "Within 5 days.");
        assert_eq!(result.chunks.len(), DEFAULT_TOP_K);
        assert_eq!(result.chunks[0].text, "Refunds are issued within 5 days.");
        assert_eq!(result.chunks[0].metadata, ChunkMetadata::new("policy.pdf", 0, 0));

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.0));

        let prompt = &requests[0].messages[0].content;
        assert!(prompt.contains("User Query: Refunds are issued within 5 days.\n"));
        assert!(prompt.contains("[1] (source: policy.pdf, page 1)"));
        assert!(prompt.contains("Refunds are issued within 5 days."));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch() {
        let engine = engine(
            Arc::new(MockEmbeddingProvider::new(DIMS).with_returned_dimensions(3)),
            Arc::new(InMemoryVectorIndex::new(DIMS)),
            Arc::new(MockLlmProvider::new().with_response("unused")),
        );

        let err = engine.answer("hello", None).await.unwrap_err();

        assert!(matches!(err, DomainError::EmbeddingService { .. }));
    }

    #[tokio::test]
    async fn test_search_uses_requested_k() {
        let mut index = MockVectorIndex::new();
        index.expect_dimensions().return_const(DIMS);
        index.expect_provider_type().return_const("mock");
        index
            .expect_search()
            .withf(|vector, k| vector.len() == DIMS && *k == 5)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let engine = engine(
            Arc::new(MockEmbeddingProvider::new(DIMS)),
            Arc::new(index),
            Arc::new(MockLlmProvider::new().with_response("ok")),
        );

        assert_eq!(engine.answer("hello", Some(5)).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_gateway_errors_propagate() {
        let mut index = MockVectorIndex::new();
        index.expect_dimensions().return_const(DIMS);
        index.expect_provider_type().return_const("mock");
        index
            .expect_search()
            .returning(|_, _| Err(DomainError::index("mock", "unreachable")));

        let llm = Arc::new(MockLlmProvider::new().with_response("unused"));
        let engine = engine(Arc::new(MockEmbeddingProvider::new(DIMS)), Arc::new(index), llm.clone());

        let err = engine.answer("hello", None).await.unwrap_err();
        assert!(matches!(err, DomainError::IndexService { .. }));
        assert!(llm.requests().is_empty());

        let engine = engine_with_failing_llm();
        let err = engine.answer("hello", None).await.unwrap_err();
        assert!(matches!(err, DomainError::GenerationService { .. }));
    }

    fn engine_with_failing_llm() -> QueryEngine {
        QueryEngine::new(
            Arc::new(MockEmbeddingProvider::new(DIMS)),
            Arc::new(InMemoryVectorIndex::new(DIMS)),
            Arc::new(MockLlmProvider::new().with_error("safety block")),
        )
    }

    #[test]
    fn test_builder_settings() {
        let engine = QueryEngine::new(
            Arc::new(MockEmbeddingProvider::new(DIMS)),
            Arc::new(InMemoryVectorIndex::new(DIMS)),
            Arc::new(MockLlmProvider::new()),
        )
        .with_llm_model("gemini-1.5-pro")
        .with_default_k(4);

        assert_eq!(engine.llm_model, "gemini-1.5-pro");
        assert_eq!(engine.embedding_model, "mock-embedding");
        assert_eq!(engine.default_k(), 4);
    }
}
