use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewUser, User, UserId};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `ConstraintViolation` when the e-mail is taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}
