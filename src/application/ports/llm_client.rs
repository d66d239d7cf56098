use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::domain::Message;

/// Text fragments of one completion, consumable once, finite.
pub type LlmTokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmClientError>> + Send + 'static>>;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_stream(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<LlmTokenStream, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
}
