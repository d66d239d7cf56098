mod pg_pool;
mod repositories;
mod vector_store;

pub use pg_pool::{create_pool, run_migrations};
pub use repositories::{
    InMemoryConversationRepository, InMemoryUserRepository, PgConversationRepository,
    PgUserRepository,
};
pub use vector_store::{InMemoryVectorStore, JsonSnapshotStore};
