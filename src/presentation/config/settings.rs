use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub embeddings: EmbeddingsSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub registry: RegistrySettings,
    pub auth: AuthSettings,
    pub subscription: SubscriptionSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Defaults, then `appsettings.<env>.toml`, then `APP__SECTION__KEY` variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.file_suffix()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Without a URL the service keeps users and turns in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Extra connection attempts at startup, with doubling delay.
    pub connect_retries: u32,
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
            connect_retries: 5,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: String,
    pub base_url: Option<String>,
    pub azure_endpoint: Option<String>,
    pub azure_api_version: String,
    pub api_key: String,
    pub chat_model: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    pub connect_timeout_secs: u64,
    pub stream_idle_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            base_url: None,
            azure_endpoint: None,
            azure_api_version: "2024-06-01".to_string(),
            api_key: String::new(),
            chat_model: "deepseek-chat".to_string(),
            temperature: 1.0,
            max_tokens: None,
            connect_timeout_secs: 10,
            stream_idle_timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingsSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for EmbeddingsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "text-embedding-3-large".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub data_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub top_k: usize,
    pub similarity_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            snapshot_path: PathBuf::from("vector-store/docs.json"),
            top_k: 5,
            similarity_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub ttl_secs: u64,
    pub reap_interval_secs: u64,
    pub max_messages: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            ttl_secs: 2 * 60 * 60,
            reap_interval_secs: 30 * 60,
            max_messages: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionSettings {
    pub trial_days: i64,
    /// Fixed offset standing in for Asia/Tehran.
    pub utc_offset_minutes: i32,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            trial_days: 100,
            utc_offset_minutes: crate::domain::TEHRAN_UTC_OFFSET_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub enable_json: bool,
}
