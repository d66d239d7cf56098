use std::fmt;

use super::{ConversationId, UserId};

/// Registry key; conversation ids are only unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub user_id: UserId,
    pub conversation_id: ConversationId,
}

impl ConversationKey {
    pub fn new(user_id: UserId, conversation_id: ConversationId) -> Self {
        Self {
            user_id,
            conversation_id,
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.user_id, self.conversation_id)
    }
}
