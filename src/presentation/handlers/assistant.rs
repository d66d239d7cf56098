use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header::CACHE_CONTROL;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::conversations::parse_conversation_id;
use super::{ApiError, AuthenticatedUser};
use crate::application::services::{ChatEvent, ChatRequest, DONE_MARKER, STREAM_FAILURE_MESSAGE};
use crate::domain::{ConversationId, Persona};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantBody {
    #[serde(default)]
    pub message: String,
    pub conversation_id: Option<String>,
    pub persona: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitBody {
    pub conversation_id: Option<String>,
    pub persona: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub conversation_id: String,
    pub message: &'static str,
}

fn parse_persona(raw: Option<&str>) -> Result<Option<Persona>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|slug| slug.parse::<Persona>().map_err(ApiError::BadRequest))
        .transpose()
}

fn require_conversation_id(raw: Option<&str>) -> Result<ConversationId, ApiError> {
    parse_conversation_id(raw)?
        .ok_or_else(|| ApiError::BadRequest("Conversation ID is required".to_string()))
}

/// Wire form of one chat event.
pub fn to_sse_event(event: ChatEvent) -> Event {
    match event {
        ChatEvent::Token(fragment) => Event::default().data(json!({ "data": fragment }).to_string()),
        ChatEvent::End => Event::default()
            .event("end")
            .data(json!({ "data": DONE_MARKER }).to_string()),
        ChatEvent::Error => Event::default()
            .event("error")
            .data(json!({ "error": STREAM_FAILURE_MESSAGE }).to_string()),
    }
}

/// Streams one chat turn. Credentials and subscription are checked before the
/// body is looked at, so an expired user never reaches the model.
#[tracing::instrument(skip_all)]
pub async fn assistant_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    body: Result<Json<AssistantBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    state.access_service.require_subscription(user_id).await?;

    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if body.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }
    let conversation_id = require_conversation_id(body.conversation_id.as_deref())?;
    let persona = parse_persona(body.persona.as_deref())?;

    tracing::debug!(
        user_id = %user_id,
        conversation_id = %conversation_id,
        prompt = %sanitize_prompt(&body.message),
        "Processing chat turn"
    );

    let events = state
        .chat_service
        .start_turn(ChatRequest {
            user_id,
            conversation_id,
            message: body.message,
            persona,
        })
        .await?;

    let sse_stream = events.map(|event| Ok::<_, Infallible>(to_sse_event(event)));

    Ok((
        [(CACHE_CONTROL, "no-cache, no-transform")],
        Sse::new(sse_stream),
    )
        .into_response())
}

pub async fn init_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(body): Json<InitBody>,
) -> Result<Json<InitResponse>, ApiError> {
    let conversation_id = require_conversation_id(body.conversation_id.as_deref())?;
    let persona = parse_persona(body.persona.as_deref())?.unwrap_or_default();

    state
        .conversation_service
        .init_conversation(user_id, &conversation_id, persona)
        .await?;

    Ok(Json(InitResponse {
        conversation_id: conversation_id.into(),
        message: "Conversation initialized.",
    }))
}
