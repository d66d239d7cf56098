use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{SearchResult, VectorStore, VectorStoreError};
use crate::domain::{Chunk, Embedding};

/// Brute-force cosine search over a collection held in memory.
///
/// Searches score a cloned `Arc` of the collection outside the lock and see
/// either the old or the new collection in full.
#[derive(Default)]
pub struct InMemoryVectorStore {
    chunks: RwLock<Arc<Vec<Chunk>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn snapshot(&self) -> Arc<Vec<Chunk>> {
        Arc::clone(&*self.chunks.read().await)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn replace(&self, chunks: Vec<Chunk>) -> Result<(), VectorStoreError> {
        if let Some(first) = chunks.first() {
            let expected = first.embedding.dimensions();
            if let Some(bad) = chunks
                .iter()
                .find(|c| c.embedding.dimensions() != expected)
            {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    actual: bad.embedding.dimensions(),
                });
            }
        }

        *self.chunks.write().await = Arc::new(chunks);
        Ok(())
    }

    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let chunks = self.snapshot().await;
        let Some(first) = chunks.first() else {
            return Ok(Vec::new());
        };

        let expected = first.embedding.dimensions();
        if embedding.dimensions() != expected {
            return Err(VectorStoreError::DimensionMismatch {
                expected,
                actual: embedding.dimensions(),
            });
        }

        let mut scored: Vec<(usize, f32)> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (i, embedding.cosine_similarity(&chunk.embedding)))
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .filter(|(_, score)| *score > min_score)
            .take(top_k)
            .map(|(i, score)| SearchResult {
                chunk: chunks[i].clone(),
                score,
            })
            .collect())
    }

    async fn chunks(&self) -> Vec<Chunk> {
        self.snapshot().await.as_ref().clone()
    }

    async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }
}
