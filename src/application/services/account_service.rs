use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::instrument;

use crate::application::ports::{
    AuthError, PasswordHasher, RepositoryError, TokenService, UserRepository,
};
use crate::domain::{NewUser, User, UserId};

pub const DEFAULT_TRIAL_DAYS: i64 = 100;

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    trial: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        trial_days: i64,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            trial: Duration::days(trial_days),
        }
    }

    /// Creates the account with a trial subscription.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<User, AccountError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AccountError::InvalidInput("a valid email is required".into()));
        }
        if request.password.is_empty() {
            return Err(AccountError::InvalidInput("password is required".into()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let new_user = NewUser {
            email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            valid_until: Some(Utc::now() + self.trial),
        };

        let user = self.users.create(&new_user).await.map_err(|e| match e {
            RepositoryError::ConstraintViolation(_) => AccountError::EmailTaken,
            other => AccountError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AccountError::UserNotFound)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(self.tokens.issue(user.id)?)
    }

    pub async fn profile(&self, user_id: UserId) -> Result<User, AccountError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("user already exists")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidCredentials,
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
