use async_trait::async_trait;

use crate::domain::Chunk;

/// Durable point-in-time copy of the vector store contents.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when no snapshot exists yet.
    async fn load(&self) -> Result<Option<Vec<Chunk>>, SnapshotStoreError>;

    async fn save(&self, chunks: &[Chunk]) -> Result<(), SnapshotStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
}
