mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuthSettings, ChunkingSettings, DatabaseSettings, EmbeddingsSettings, LlmSettings,
    LoggingSettings, RegistrySettings, RetrievalSettings, ServerSettings, Settings,
    SubscriptionSettings,
};
