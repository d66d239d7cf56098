use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, AuthenticatedUser};
use crate::domain::{ConversationId, ConversationSummary, Turn};
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListItem {
    pub conversation_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationSummary> for ConversationListItem {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            conversation_id: summary.conversation_id.into(),
            name: summary.name,
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnItem {
    pub id: Uuid,
    pub user_id: i64,
    pub conversation_id: String,
    pub sender: &'static str,
    pub message: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Turn> for TurnItem {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id.as_uuid(),
            user_id: turn.user_id.as_i64(),
            conversation_id: turn.conversation_id.into(),
            sender: turn.sender.as_str(),
            message: turn.message,
            name: turn.name,
            created_at: turn.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Parses an optional `conversationId`, treating a blank value as absent.
pub(crate) fn parse_conversation_id(raw: Option<&str>) -> Result<Option<ConversationId>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => ConversationId::parse(raw)
            .map(Some)
            .map_err(ApiError::BadRequest),
    }
}

/// Without `conversationId`: one entry per conversation, newest first.
/// With it: that conversation's turns, oldest first.
pub async fn list_conversations_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<ConversationQuery>,
) -> Result<Response, ApiError> {
    match parse_conversation_id(query.conversation_id.as_deref())? {
        Some(conversation_id) => {
            let turns = state
                .conversation_service
                .list_turns(user_id, &conversation_id)
                .await?;
            let items: Vec<TurnItem> = turns.into_iter().map(TurnItem::from).collect();
            Ok(Json(items).into_response())
        }
        None => {
            let conversations = state.conversation_service.list_conversations(user_id).await?;
            let items: Vec<ConversationListItem> = conversations
                .into_iter()
                .map(ConversationListItem::from)
                .collect();
            Ok(Json(items).into_response())
        }
    }
}

pub async fn delete_conversation_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let conversation_id = parse_conversation_id(query.conversation_id.as_deref())?
        .ok_or_else(|| ApiError::BadRequest("Conversation ID is required".to_string()))?;

    state
        .conversation_service
        .delete_conversation(user_id, &conversation_id)
        .await?;
    Ok(Json(DeleteResponse { success: true }))
}
