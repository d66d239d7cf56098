use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{ConversationRepository, RepositoryError, UserRepository};
use crate::domain::{ConversationId, ConversationSummary, NewUser, Turn, User, UserId};

/// Turns kept in insertion order; used without a database and in tests.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    turns: RwLock<Vec<Turn>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Turn> {
        self.turns.read().await.clone()
    }
}

fn belongs_to(turn: &Turn, user_id: UserId, conversation_id: &ConversationId) -> bool {
    turn.user_id == user_id && &turn.conversation_id == conversation_id
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn append(&self, turn: &Turn) -> Result<(), RepositoryError> {
        self.turns.write().await.push(turn.clone());
        Ok(())
    }

    async fn list_ordered(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Turn>, RepositoryError> {
        let mut turns: Vec<Turn> = self
            .turns
            .read()
            .await
            .iter()
            .filter(|t| belongs_to(t, user_id, conversation_id))
            .cloned()
            .collect();
        turns.sort_by_key(|t| t.created_at);
        Ok(turns)
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let turns = self.turns.read().await;
        // Later turns overwrite earlier ones, leaving the latest per conversation.
        let mut latest: HashMap<&ConversationId, (usize, &Turn)> = HashMap::new();
        for (position, turn) in turns.iter().enumerate().filter(|(_, t)| t.user_id == user_id) {
            latest.insert(&turn.conversation_id, (position, turn));
        }

        let mut entries: Vec<(usize, &Turn)> = latest.into_values().collect();
        entries.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });

        Ok(entries
            .into_iter()
            .map(|(_, turn)| ConversationSummary {
                conversation_id: turn.conversation_id.clone(),
                name: turn.name.clone(),
                created_at: turn.created_at,
            })
            .collect())
    }

    async fn find_name(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .turns
            .read()
            .await
            .iter()
            .find(|t| belongs_to(t, user_id, conversation_id))
            .map(|t| t.name.clone()))
    }

    async fn delete_all(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, RepositoryError> {
        let mut turns = self.turns.write().await;
        let before = turns.len();
        turns.retain(|t| !belongs_to(t, user_id, conversation_id));
        Ok((before - turns.len()) as u64)
    }
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    users: Vec<User>,
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut table = self.table.write().await;
        if table.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "email already registered: {}",
                user.email
            )));
        }

        table.next_id += 1;
        let created = User {
            id: UserId::new(table.next_id),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            valid_until: user.valid_until,
            created_at: Utc::now(),
        };
        table.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .table
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .table
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }
}
