use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeResponse {
    pub server_time_utc: String,
    pub tehran_time: String,
    pub utc_offset: String,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Clock used for subscription checks, next to the server's UTC clock.
pub async fn time_handler(State(state): State<AppState>) -> Json<TimeResponse> {
    let now = Utc::now();
    let offset = state.access_service.timezone();
    Json(TimeResponse {
        server_time_utc: now.to_rfc3339(),
        tehran_time: now.with_timezone(&offset).to_rfc3339(),
        utc_offset: offset.to_string(),
    })
}
