mod in_memory_repository;
mod pg_conversation_repository;
mod pg_user_repository;

pub use in_memory_repository::{InMemoryConversationRepository, InMemoryUserRepository};
pub use pg_conversation_repository::PgConversationRepository;
pub use pg_user_repository::PgUserRepository;
