mod conversation_repository;
mod document_loader;
mod embedder;
mod llm_client;
mod repository_error;
mod snapshot_store;
mod text_splitter;
mod token_service;
mod user_repository;
mod vector_store;
mod vector_store_error;

pub use conversation_repository::ConversationRepository;
pub use document_loader::DocumentLoader;
pub use embedder::{Embedder, EmbedderError};
pub use llm_client::{LlmClient, LlmClientError, LlmTokenStream};
pub use repository_error::RepositoryError;
pub use snapshot_store::{SnapshotStore, SnapshotStoreError};
pub use text_splitter::{TextSplitter, TextSplitterError};
pub use token_service::{AuthError, PasswordHasher, TokenService};
pub use user_repository::UserRepository;
pub use vector_store::{SearchResult, VectorStore};
pub use vector_store_error::VectorStoreError;
