use chrono::{DateTime, Utc};

use super::{ConversationId, Message, Sender, TurnId, UserId};

/// One durable, immutable message of a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: TurnId,
    pub user_id: UserId,
    pub conversation_id: ConversationId,
    pub sender: Sender,
    pub message: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(
        user_id: UserId,
        conversation_id: ConversationId,
        sender: Sender,
        message: String,
        name: String,
    ) -> Self {
        Self {
            id: TurnId::new(),
            user_id,
            conversation_id,
            sender,
            message,
            name,
            created_at: Utc::now(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::new(self.sender.role(), self.message.clone())
    }
}
