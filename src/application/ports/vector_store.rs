use async_trait::async_trait;

use super::VectorStoreError;
use crate::domain::{Chunk, Embedding};

/// One scored hit; `score` is the cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Swaps the whole collection. Never merges.
    async fn replace(&self, chunks: Vec<Chunk>) -> Result<(), VectorStoreError>;

    /// Results are sorted by descending score; every score is above `min_score`.
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    async fn chunks(&self) -> Vec<Chunk>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
