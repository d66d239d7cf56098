use async_trait::async_trait;

#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(&self, text: &str) -> Result<Vec<String>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
