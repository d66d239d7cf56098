use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{ConversationId, ConversationSummary, Turn, UserId};

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn append(&self, turn: &Turn) -> Result<(), RepositoryError>;

    /// All turns of one conversation, oldest first.
    async fn list_ordered(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Turn>, RepositoryError>;

    /// One entry per conversation, most recently active first.
    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError>;

    async fn find_name(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, RepositoryError>;

    /// Returns the number of deleted turns.
    async fn delete_all(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, RepositoryError>;
}
