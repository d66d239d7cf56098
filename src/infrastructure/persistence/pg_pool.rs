use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;
use crate::presentation::config::DatabaseSettings;

const FIRST_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Connects with exponential backoff so the service can start alongside its database.
#[instrument(skip_all, fields(max_connections = settings.max_connections))]
pub async fn create_pool(url: &str, settings: &DatabaseSettings) -> Result<PgPool, RepositoryError> {
    let options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

    let mut delay = FIRST_RETRY_DELAY;
    for attempt in 0..=settings.connect_retries {
        match options.clone().connect(url).await {
            Ok(pool) => {
                info!(attempt, "connected to PostgreSQL");
                return Ok(pool);
            }
            Err(e) if attempt < settings.connect_retries => {
                warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "PostgreSQL unreachable, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(RepositoryError::ConnectionFailed(e.to_string())),
        }
    }
    Err(RepositoryError::ConnectionFailed(
        "no connection attempt was made".to_string(),
    ))
}

/// Applies `migrations/` to the users and conversation_turns schema.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| RepositoryError::MigrationFailed(e.to_string()))?;
    info!("database migrations applied");
    Ok(())
}
