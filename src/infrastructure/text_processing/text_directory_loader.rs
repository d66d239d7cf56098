use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::application::ports::{DocumentLoader, TextSplitter};

const TEXT_EXTENSION: &str = "txt";

/// Loads every `.txt` file of a directory, in file-name order, and splits it.
pub struct TextDirectoryLoader {
    splitter: Arc<dyn TextSplitter>,
}

impl TextDirectoryLoader {
    pub fn new(splitter: Arc<dyn TextSplitter>) -> Self {
        Self { splitter }
    }

    async fn text_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(directory).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_text = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TEXT_EXTENSION));
            if is_text && entry.file_type().await?.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl DocumentLoader for TextDirectoryLoader {
    #[instrument(skip(self), fields(directory = %directory.display()))]
    async fn load(&self, directory: &Path) -> Vec<String> {
        let files = match Self::text_files(directory).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read document directory");
                return Vec::new();
            }
        };

        let mut chunks = Vec::new();
        for path in files {
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping unreadable document");
                    continue;
                }
            };
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

            match self.splitter.split(text).await {
                Ok(pieces) => {
                    tracing::debug!(file = %path.display(), chunks = pieces.len(), "document split");
                    chunks.extend(pieces);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping document");
                }
            }
        }

        tracing::info!(chunks = chunks.len(), "documents loaded");
        chunks
    }
}
