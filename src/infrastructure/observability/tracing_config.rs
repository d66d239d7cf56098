use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    pub level: Option<String>,
}

impl TracingConfig {
    /// Production logs JSON; elsewhere `LOG_FORMAT=json` or `logging.enable_json` opts in.
    pub fn from_settings(environment: Environment, logging: &LoggingSettings) -> Self {
        let json_from_env = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        Self {
            environment: environment.to_string(),
            json_format: environment == Environment::Prod || logging.enable_json || json_from_env,
            level: logging.level.clone(),
        }
    }
}
