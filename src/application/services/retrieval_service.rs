use std::sync::Arc;

use tracing::instrument;

use crate::application::ports::{
    Embedder, EmbedderError, SearchResult, VectorStore, VectorStoreError,
};

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.1;

pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    similarity_threshold: f32,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            similarity_threshold,
        }
    }

    /// At most `k` chunks, best first, each scoring strictly above the threshold.
    #[instrument(skip(self, query), fields(query_len = query.chars().count()))]
    pub async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        if k == 0 || self.vector_store.is_empty().await {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RetrievalError::Embedding)?;

        let results = self
            .vector_store
            .search(&query_embedding, k, self.similarity_threshold)
            .await?;

        tracing::debug!(hits = results.len(), "similarity search finished");
        Ok(results)
    }

    /// Retrieved chunk texts joined by newlines; empty when nothing matched.
    pub async fn context(&self, query: &str, k: usize) -> Result<String, RetrievalError> {
        let results = self.similarity_search(query, k).await?;
        Ok(results
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("search: {0}")]
    Search(#[from] VectorStoreError),
}
