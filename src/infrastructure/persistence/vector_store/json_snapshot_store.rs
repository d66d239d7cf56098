use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use crate::application::ports::{SnapshotStore, SnapshotStoreError};
use crate::domain::Chunk;

/// Ordered chunk list stored as one JSON document.
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<Vec<Chunk>>, SnapshotStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let chunks: Vec<Chunk> = serde_json::from_slice(&bytes)
            .map_err(|e| SnapshotStoreError::Corrupt(e.to_string()))?;
        Ok(Some(chunks))
    }

    #[instrument(skip(self, chunks), fields(path = %self.path.display(), chunks = chunks.len()))]
    async fn save(&self, chunks: &[Chunk]) -> Result<(), SnapshotStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec(chunks)
            .map_err(|e| SnapshotStoreError::Serialization(e.to_string()))?;

        // Atomic replace of the previous snapshot.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
