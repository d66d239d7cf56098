use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{ConversationId, ConversationSummary, Sender, Turn, TurnId, UserId};

pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TurnRow {
    id: Uuid,
    user_id: i64,
    conversation_id: String,
    sender: String,
    message: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TurnRow> for Turn {
    type Error = RepositoryError;

    fn try_from(row: TurnRow) -> Result<Self, Self::Error> {
        Ok(Turn {
            id: TurnId::from_uuid(row.id),
            user_id: UserId::new(row.user_id),
            conversation_id: row
                .conversation_id
                .parse()
                .map_err(RepositoryError::InvalidRow)?,
            sender: row
                .sender
                .parse::<Sender>()
                .map_err(RepositoryError::InvalidRow)?,
            message: row.message,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SummaryRow {
    conversation_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self, turn), fields(turn_id = %turn.id.as_uuid(), conversation_id = %turn.conversation_id))]
    async fn append(&self, turn: &Turn) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversation_turns (id, user_id, conversation_id, sender, message, name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(turn.id.as_uuid())
        .bind(turn.user_id.as_i64())
        .bind(turn.conversation_id.as_str())
        .bind(turn.sender.as_str())
        .bind(&turn.message)
        .bind(&turn.name)
        .bind(turn.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, conversation_id = %conversation_id))]
    async fn list_ordered(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query_as::<_, TurnRow>(
            r#"
            SELECT id, user_id, conversation_id, sender, message, name, created_at
            FROM conversation_turns
            WHERE user_id = $1 AND conversation_id = $2
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(user_id.as_i64())
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter().map(Turn::try_from).collect()
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT conversation_id, name, created_at
            FROM (
                SELECT DISTINCT ON (conversation_id) conversation_id, name, created_at, seq
                FROM conversation_turns
                WHERE user_id = $1
                ORDER BY conversation_id, created_at DESC, seq DESC
            ) latest
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|r| {
                Ok(ConversationSummary {
                    conversation_id: r
                        .conversation_id
                        .parse()
                        .map_err(RepositoryError::InvalidRow)?,
                    name: r.name,
                    created_at: r.created_at,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(user_id = %user_id, conversation_id = %conversation_id))]
    async fn find_name(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, RepositoryError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM conversation_turns
            WHERE user_id = $1 AND conversation_id = $2
            ORDER BY created_at ASC, seq ASC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(conversation_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    #[instrument(skip(self), fields(user_id = %user_id, conversation_id = %conversation_id))]
    async fn delete_all(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM conversation_turns
            WHERE user_id = $1 AND conversation_id = $2
            "#,
        )
        .bind(user_id.as_i64())
        .bind(conversation_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
