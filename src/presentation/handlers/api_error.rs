use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::{
    AccessError, AccountError, ChatError, ConversationServiceError,
};

const NO_SUBSCRIPTION_EN: &str = "You need an active subscription to use the AI assistant.";
const NO_SUBSCRIPTION_FA: &str = "برای استفاده از دستیار هوش مصنوعی نیاز به اشتراک فعال دارید.";
const SUBSCRIPTION_EXPIRED_EN: &str =
    "Your subscription has expired. Please renew your subscription to continue using the AI assistant.";
const SUBSCRIPTION_EXPIRED_FA: &str = "اشتراک شما منقضی شده است. لطفاً برای ادامه استفاده از دستیار هوش مصنوعی، اشتراک خود را تمدید کنید.";

#[derive(Debug, Serialize)]
pub struct LocalizedMessage {
    pub en: &'static str,
    pub fa: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<LocalizedMessage>,
}

/// Error taxonomy of the HTTP surface. Internal details are logged, never returned.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str),
    NotFound(&'static str),
    NoSubscription,
    SubscriptionExpired,
    BadRequest(String),
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NoSubscription | ApiError::SubscriptionExpired => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorBody {
        match self {
            ApiError::Unauthorized(text) | ApiError::NotFound(text) | ApiError::Internal(text) => {
                ErrorBody {
                    error: text.to_string(),
                    code: None,
                    message: None,
                }
            }
            ApiError::BadRequest(text) => ErrorBody {
                error: text,
                code: None,
                message: None,
            },
            ApiError::NoSubscription => ErrorBody {
                error: "Subscription required".to_string(),
                code: Some("NO_SUBSCRIPTION"),
                message: Some(LocalizedMessage {
                    en: NO_SUBSCRIPTION_EN,
                    fa: NO_SUBSCRIPTION_FA,
                }),
            },
            ApiError::SubscriptionExpired => ErrorBody {
                error: "Subscription expired".to_string(),
                code: Some("SUBSCRIPTION_EXPIRED"),
                message: Some(LocalizedMessage {
                    en: SUBSCRIPTION_EXPIRED_EN,
                    fa: SUBSCRIPTION_EXPIRED_FA,
                }),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Unauthorized => ApiError::Unauthorized("Unauthorized"),
            AccessError::UserNotFound => ApiError::NotFound("User not found"),
            AccessError::NoSubscription => ApiError::NoSubscription,
            AccessError::SubscriptionExpired { .. } => ApiError::SubscriptionExpired,
            AccessError::Repository(e) => {
                tracing::error!(error = %e, "access check failed");
                ApiError::Internal("Something went wrong")
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::InvalidInput(text) => ApiError::BadRequest(text),
            AccountError::EmailTaken => ApiError::BadRequest("User already exists".to_string()),
            AccountError::UserNotFound => ApiError::NotFound("User not found"),
            AccountError::InvalidCredentials => ApiError::Unauthorized("Invalid password"),
            AccountError::Auth(e) => {
                tracing::error!(error = %e, "account operation failed");
                ApiError::Internal("Something went wrong")
            }
            AccountError::Repository(e) => {
                tracing::error!(error = %e, "account operation failed");
                ApiError::Internal("Something went wrong")
            }
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyMessage => ApiError::BadRequest("Message is required".to_string()),
            other => {
                tracing::error!(error = %other, "chat turn failed before streaming");
                ApiError::Internal("Internal server error")
            }
        }
    }
}

impl From<ConversationServiceError> for ApiError {
    fn from(e: ConversationServiceError) -> Self {
        tracing::error!(error = %e, "conversation operation failed");
        ApiError::Internal("Failed to process conversation request")
    }
}
