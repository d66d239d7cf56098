use std::sync::Arc;

use crate::application::services::{
    AccessService, AccountService, ChatService, ConversationService,
};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub access_service: Arc<AccessService>,
    pub account_service: Arc<AccountService>,
    pub conversation_service: Arc<ConversationService>,
    pub chat_service: Arc<ChatService>,
    pub settings: Arc<Settings>,
}
