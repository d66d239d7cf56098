mod api_error;
mod assistant;
mod auth;
mod authenticated_user;
mod conversations;
mod diagnostics;

pub use api_error::{ApiError, ErrorBody, LocalizedMessage};
pub use assistant::{assistant_handler, init_handler, to_sse_event};
pub use auth::{login_handler, me_handler, signup_handler};
pub use authenticated_user::AuthenticatedUser;
pub use conversations::{delete_conversation_handler, list_conversations_handler};
pub use diagnostics::{health_handler, time_handler};
