use serde::{Deserialize, Serialize};

use super::MessageRole;

/// A chat message as sent to the completion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: String) -> Self {
        Self { role, content }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into())
    }

    /// User turn carrying retrieved context; only ever kept in memory.
    pub fn augmented_question(question: &str, context: &str) -> Self {
        Self::user(format!(
            "name: User - question: {}\n\nRelevant context:\n{}",
            question, context
        ))
    }
}
