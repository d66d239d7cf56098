#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("embedding dimensions mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("replace failed: {0}")]
    ReplaceFailed(String),
}
