use chrono::{DateTime, Utc};

use super::ConversationId;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Title given to a conversation whose first turn is being written.
pub fn default_conversation_name(now: DateTime<Utc>) -> String {
    format!("c{}", now.timestamp_millis())
}
