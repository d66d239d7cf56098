use std::path::Path;
use std::sync::Arc;

use tracing::instrument;

use crate::application::ports::{
    DocumentLoader, Embedder, EmbedderError, SnapshotStore, SnapshotStoreError, VectorStore,
    VectorStoreError,
};
use crate::domain::Chunk;

/// Builds the vector store from source documents and keeps its snapshot in sync.
pub struct IngestionService {
    document_loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    snapshot_store: Arc<dyn SnapshotStore>,
}

impl IngestionService {
    pub fn new(
        document_loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        snapshot_store: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            document_loader,
            embedder,
            vector_store,
            snapshot_store,
        }
    }

    /// Embeds all texts in one batch and replaces the collection. Returns the new size.
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn add_documents(&self, texts: &[String]) -> Result<usize, IngestionError> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = self
            .embedder
            .embed_batch(&refs)
            .await
            .map_err(IngestionError::Embedding)?;

        if embeddings.len() != texts.len() {
            return Err(IngestionError::Embedding(EmbedderError::InvalidResponse(
                format!("expected {} embeddings, got {}", texts.len(), embeddings.len()),
            )));
        }

        let chunks: Vec<Chunk> = texts
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(text, embedding)| Chunk::new(text, embedding))
            .collect();
        let count = chunks.len();

        self.vector_store.replace(chunks).await?;
        Ok(count)
    }

    pub async fn save(&self) -> Result<(), IngestionError> {
        let chunks = self.vector_store.chunks().await;
        self.snapshot_store.save(&chunks).await?;
        tracing::info!(chunks = chunks.len(), "vector store snapshot saved");
        Ok(())
    }

    /// Loads the snapshot when it parses, else rebuilds from `source_dir` and persists.
    #[instrument(skip(self))]
    pub async fn load_or_create(&self, source_dir: &Path) -> Result<usize, IngestionError> {
        match self.snapshot_store.load().await {
            Ok(Some(chunks)) => {
                let count = chunks.len();
                self.vector_store.replace(chunks).await?;
                tracing::info!(chunks = count, "vector store loaded from snapshot");
                return Ok(count);
            }
            Ok(None) => tracing::info!("no vector store snapshot, building from documents"),
            Err(e) => tracing::warn!(error = %e, "vector store snapshot unusable, rebuilding"),
        }

        let texts = self.document_loader.load(source_dir).await;
        let count = self.add_documents(&texts).await?;
        self.save().await?;
        tracing::info!(chunks = count, "vector store built");
        Ok(count)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("storage: {0}")]
    Storage(#[from] VectorStoreError),
    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotStoreError),
}
