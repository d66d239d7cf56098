use std::fmt;
use std::str::FromStr;

use super::MessageRole;

/// Author of a persisted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Column value. Assistant rows are stored as `ai`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "ai",
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Sender::User => MessageRole::User,
            Sender::Assistant => MessageRole::Assistant,
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "ai" | "assistant" => Ok(Sender::Assistant),
            _ => Err(format!("Invalid sender: {}", s)),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
