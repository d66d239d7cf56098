use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::instrument;

use super::conversation_service::replay_history;
use super::{ConversationHandle, ConversationRegistry, RetrievalError, RetrievalService};
use crate::application::ports::{ConversationRepository, LlmClient, LlmClientError, RepositoryError};
use crate::domain::{
    ConversationId, ConversationKey, Message, Persona, Sender, Turn, UserId,
    default_conversation_name,
};

pub const STREAM_FAILURE_MESSAGE: &str = "Streaming failed";
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub top_k: usize,
    pub temperature: f32,
    pub stream_idle_timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            temperature: 1.0,
            stream_idle_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub message: String,
    pub persona: Option<Persona>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Token(String),
    End,
    Error,
}

pub type ChatEventStream = BoxStream<'static, ChatEvent>;

/// Runs one chat turn: hydrate, persist, retrieve, stream, persist.
pub struct ChatService {
    conversations: Arc<dyn ConversationRepository>,
    registry: Arc<ConversationRegistry>,
    retrieval: Arc<RetrievalService>,
    llm: Arc<dyn LlmClient>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        registry: Arc<ConversationRegistry>,
        retrieval: Arc<RetrievalService>,
        llm: Arc<dyn LlmClient>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            conversations,
            registry,
            retrieval,
            llm,
            settings,
        }
    }

    /// Everything up to the model call happens before this returns, so
    /// failures here can still be reported as a plain error response. Once the
    /// stream is handed out, failures only surface as [`ChatEvent::Error`].
    ///
    /// The returned stream holds the conversation lock until it finishes or is
    /// dropped.
    #[instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            conversation_id = %request.conversation_id,
        )
    )]
    pub async fn start_turn(&self, request: ChatRequest) -> Result<ChatEventStream, ChatError> {
        if request.message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let ChatRequest {
            user_id,
            conversation_id,
            message,
            persona,
        } = request;

        // Everything from hydration to the stored reply happens under the
        // conversation lock, so a turn never replays another turn's question.
        let key = ConversationKey::new(user_id, conversation_id.clone());
        let mut handle = self
            .registry
            .acquire(&key, persona.unwrap_or_default(), || {
                replay_history(self.conversations.as_ref(), user_id, &conversation_id)
            })
            .await?;

        let name = self
            .conversations
            .find_name(user_id, &conversation_id)
            .await?
            .unwrap_or_else(|| default_conversation_name(Utc::now()));

        let user_turn = Turn::new(
            user_id,
            conversation_id.clone(),
            Sender::User,
            message.clone(),
            name.clone(),
        );
        self.conversations.append(&user_turn).await?;

        let context = self.retrieval.context(&message, self.settings.top_k).await?;
        handle.push(Message::augmented_question(&message, &context));

        let turn = PendingTurn {
            handle,
            conversations: Arc::clone(&self.conversations),
            llm: Arc::clone(&self.llm),
            settings: self.settings,
            user_id,
            conversation_id,
            name,
        };

        Ok(turn.run().boxed())
    }
}

struct PendingTurn {
    handle: ConversationHandle,
    conversations: Arc<dyn ConversationRepository>,
    llm: Arc<dyn LlmClient>,
    settings: ChatSettings,
    user_id: UserId,
    conversation_id: ConversationId,
    name: String,
}

impl PendingTurn {
    fn run(self) -> impl futures::Stream<Item = ChatEvent> + Send + 'static {
        let PendingTurn {
            mut handle,
            conversations,
            llm,
            settings,
            user_id,
            conversation_id,
            name,
        } = self;

        async_stream::stream! {
            let request = llm.complete_stream(handle.messages(), settings.temperature);
            let mut tokens = match tokio::time::timeout(settings.stream_idle_timeout, request).await {
                Ok(Ok(tokens)) => tokens,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "completion request failed");
                    yield ChatEvent::Error;
                    return;
                }
                Err(_) => {
                    tracing::error!(
                        timeout = ?settings.stream_idle_timeout,
                        "completion request got no response"
                    );
                    yield ChatEvent::Error;
                    return;
                }
            };

            let mut reply = String::new();
            loop {
                let next = tokio::time::timeout(settings.stream_idle_timeout, tokens.next()).await;
                match next {
                    Ok(Some(Ok(fragment))) => {
                        reply.push_str(&fragment);
                        yield ChatEvent::Token(fragment);
                    }
                    Ok(Some(Err(e))) => {
                        tracing::error!(error = %e, "completion stream failed");
                        yield ChatEvent::Error;
                        return;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        let e = LlmClientError::StreamInterrupted(format!(
                            "no fragment within {:?}",
                            settings.stream_idle_timeout
                        ));
                        tracing::error!(error = %e, "completion stream stalled");
                        yield ChatEvent::Error;
                        return;
                    }
                }
            }

            handle.push(Message::assistant(reply.clone()));
            let assistant_turn = Turn::new(user_id, conversation_id, Sender::Assistant, reply, name);
            if let Err(e) = conversations.append(&assistant_turn).await {
                tracing::error!(error = %e, "failed to persist assistant turn");
            }
            tracing::debug!(messages = handle.messages().len(), "chat turn finished");

            yield ChatEvent::End;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is required")]
    EmptyMessage,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("retrieval: {0}")]
    Retrieval(#[from] RetrievalError),
}
