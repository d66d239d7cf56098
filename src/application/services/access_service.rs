use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::instrument;

use crate::application::ports::{RepositoryError, TokenService, UserRepository};
use crate::domain::{SubscriptionStatus, User, UserId, wall_clock_as_utc};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves bearer credentials to users and gates access on their subscription.
pub struct AccessService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    timezone: FixedOffset,
}

impl AccessService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        timezone: FixedOffset,
    ) -> Self {
        Self {
            users,
            tokens,
            timezone,
        }
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    /// Accepts the raw `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<UserId, AccessError> {
        let token = authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AccessError::Unauthorized)?;

        self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AccessError::Unauthorized
        })
    }

    #[instrument(skip(self))]
    pub async fn require_subscription(&self, user_id: UserId) -> Result<User, AccessError> {
        self.require_subscription_at(user_id, Utc::now()).await
    }

    pub async fn require_subscription_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<User, AccessError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;

        let clock = wall_clock_as_utc(now, self.timezone);
        match SubscriptionStatus::evaluate(user.valid_until, clock) {
            SubscriptionStatus::Active { .. } => Ok(user),
            SubscriptionStatus::Missing => {
                tracing::info!(user_id = %user_id, "no subscription");
                Err(AccessError::NoSubscription)
            }
            SubscriptionStatus::Expired { valid_until } => {
                tracing::info!(user_id = %user_id, %valid_until, now = %clock, "subscription expired");
                Err(AccessError::SubscriptionExpired { valid_until })
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("user not found")]
    UserNotFound,
    #[error("subscription required")]
    NoSubscription,
    #[error("subscription expired at {valid_until}")]
    SubscriptionExpired { valid_until: DateTime<Utc> },
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
