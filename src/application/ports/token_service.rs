use crate::domain::UserId;

pub trait TokenService: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token creation failed: {0}")]
    TokenCreationFailed(String),
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}
