use serde::{Deserialize, Serialize};

use super::Embedding;

/// A bounded slice of a source document together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub embedding: Embedding,
}

impl Chunk {
    pub fn new(text: String, embedding: Embedding) -> Self {
        Self { text, embedding }
    }
}
