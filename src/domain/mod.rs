mod chunk;
mod conversation;
mod conversation_id;
mod conversation_key;
mod embedding;
mod message;
mod message_role;
mod persona;
mod sender;
mod subscription;
mod turn;
mod turn_id;
mod user;
mod user_id;

pub use chunk::Chunk;
pub use conversation::{ConversationSummary, default_conversation_name};
pub use conversation_id::ConversationId;
pub use conversation_key::ConversationKey;
pub use embedding::Embedding;
pub use message::Message;
pub use message_role::MessageRole;
pub use persona::Persona;
pub use sender::Sender;
pub use subscription::{
    SubscriptionStatus, TEHRAN_UTC_OFFSET_MINUTES, utc_offset, wall_clock_as_utc,
};
pub use turn::Turn;
pub use turn_id::TurnId;
pub use user::{NewUser, User};
pub use user_id::UserId;
