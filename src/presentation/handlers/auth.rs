use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, AuthenticatedUser};
use crate::application::services::SignupRequest;
use crate::domain::User;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: &'static str,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i64(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            valid_until: user.valid_until,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

pub async fn signup_handler(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<Json<SignupResponse>, ApiError> {
    let user = state
        .account_service
        .signup(SignupRequest {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    Ok(Json(SignupResponse {
        message: "User created successfully",
        user_id: user.id.as_i64(),
    }))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state
        .account_service
        .login(&body.email, &body.password)
        .await?;
    Ok(Json(LoginResponse { token }))
}

pub async fn me_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.account_service.profile(user_id).await?;
    Ok(Json(MeResponse { user: user.into() }))
}
