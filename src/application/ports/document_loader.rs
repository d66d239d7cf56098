use std::path::Path;

use async_trait::async_trait;

/// Turns a directory of source documents into chunk texts.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Infallible: unreadable input degrades to fewer (or no) chunks.
    async fn load(&self, directory: &Path) -> Vec<String>;
}
