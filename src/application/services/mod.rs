mod access_service;
mod account_service;
mod chat_service;
mod conversation_registry;
mod conversation_service;
mod ingestion_service;
mod retrieval_service;

pub use access_service::{AccessError, AccessService};
pub use account_service::{AccountError, AccountService, DEFAULT_TRIAL_DAYS, SignupRequest};
pub use chat_service::{
    ChatError, ChatEvent, ChatEventStream, ChatRequest, ChatService, ChatSettings, DONE_MARKER,
    STREAM_FAILURE_MESSAGE,
};
pub use conversation_registry::{
    ConversationHandle, ConversationRegistry, DEFAULT_MAX_MESSAGES, DEFAULT_REAP_INTERVAL,
    DEFAULT_TTL, RegistryConfig,
};
pub use conversation_service::{ConversationService, ConversationServiceError};
pub use ingestion_service::{IngestionError, IngestionService};
pub use retrieval_service::{DEFAULT_SIMILARITY_THRESHOLD, RetrievalError, RetrievalService};
