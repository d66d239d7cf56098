use std::sync::Arc;

use tracing::instrument;

use super::ConversationRegistry;
use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{
    ConversationId, ConversationKey, ConversationSummary, Message, Persona, Turn, UserId,
};

pub struct ConversationService {
    repository: Arc<dyn ConversationRepository>,
    registry: Arc<ConversationRegistry>,
}

impl ConversationService {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        registry: Arc<ConversationRegistry>,
    ) -> Self {
        Self {
            repository,
            registry,
        }
    }

    pub async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationServiceError> {
        Ok(self.repository.list_conversations(user_id).await?)
    }

    pub async fn list_turns(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Turn>, ConversationServiceError> {
        Ok(self.repository.list_ordered(user_id, conversation_id).await?)
    }

    /// Deletes every turn and drops the cached entry so it cannot be replayed.
    /// A turn in flight on the conversation finishes first, so its reply is
    /// deleted with the rest.
    #[instrument(skip(self))]
    pub async fn delete_conversation(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, ConversationServiceError> {
        let key = ConversationKey::new(user_id, conversation_id.clone());
        let deleted = self
            .registry
            .evict(&key, || self.repository.delete_all(user_id, conversation_id))
            .await?;
        tracing::info!(deleted, "conversation deleted");
        Ok(deleted)
    }

    /// Hydrates the registry entry ahead of the first message.
    #[instrument(skip(self))]
    pub async fn init_conversation(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
        persona: Persona,
    ) -> Result<usize, ConversationServiceError> {
        let key = ConversationKey::new(user_id, conversation_id.clone());
        let handle = self
            .registry
            .acquire(&key, persona, || {
                replay_history(self.repository.as_ref(), user_id, conversation_id)
            })
            .await?;
        Ok(handle.messages().len())
    }
}

/// Durable turns as model messages, oldest first.
pub(crate) async fn replay_history(
    repository: &dyn ConversationRepository,
    user_id: UserId,
    conversation_id: &ConversationId,
) -> Result<Vec<Message>, RepositoryError> {
    let turns = repository.list_ordered(user_id, conversation_id).await?;
    Ok(turns.iter().map(Turn::to_message).collect())
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationServiceError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
