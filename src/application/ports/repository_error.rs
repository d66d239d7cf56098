#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("migration failed: {0}")]
    MigrationFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    /// A stored row no longer maps onto the domain, e.g. an unknown sender.
    #[error("invalid row: {0}")]
    InvalidRow(String),
    /// Unique key already taken.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}
