use std::time::Duration;

use chrono::{TimeZone, Utc};

use dadnovin::application::ports::{ConversationRepository, RepositoryError, UserRepository};
use dadnovin::domain::{ConversationId, NewUser, Sender, Turn, User};

use crate::helpers::test_postgres::TestPostgres;

async fn create_user(pg: &TestPostgres, email: &str) -> User {
    pg.user_repository
        .create(&NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            first_name: Some("Ali".to_string()),
            last_name: Some("Karimi".to_string()),
            valid_until: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
        })
        .await
        .unwrap()
}

async fn append(pg: &TestPostgres, user: &User, conversation: &str, sender: Sender, text: &str) {
    pg.conversation_repository
        .append(&Turn::new(
            user.id,
            ConversationId::parse(conversation).unwrap(),
            sender,
            text.to_string(),
            format!("name-{}", conversation),
        ))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_user_when_round_tripping_then_fields_survive() {
    let pg = TestPostgres::new().await;

    let created = create_user(&pg, "ali@example.com").await;
    let found = pg
        .user_repository
        .find_by_email("ali@example.com")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.first_name.as_deref(), Some("Ali"));
    assert_eq!(found.valid_until, created.valid_until);
    assert!(pg.user_repository.find_by_id(created.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_duplicate_email_when_creating_then_constraint_violation() {
    let pg = TestPostgres::new().await;
    create_user(&pg, "ali@example.com").await;

    let result = pg
        .user_repository
        .create(&NewUser {
            email: "ali@example.com".to_string(),
            password_hash: "other".to_string(),
            first_name: None,
            last_name: None,
            valid_until: None,
        })
        .await;

    assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_turns_when_listing_then_history_ascending_and_summaries_descending() {
    let pg = TestPostgres::new().await;
    let user = create_user(&pg, "ali@example.com").await;
    append(&pg, &user, "c1", Sender::User, "q1").await;
    append(&pg, &user, "c2", Sender::User, "other").await;
    append(&pg, &user, "c1", Sender::Assistant, "a1").await;

    let c1 = ConversationId::parse("c1").unwrap();
    let history = pg.conversation_repository.list_ordered(user.id, &c1).await.unwrap();
    let summaries = pg.conversation_repository.list_conversations(user.id).await.unwrap();

    let texts: Vec<&str> = history.iter().map(|t| t.message.as_str()).collect();
    assert_eq!(texts, vec!["q1", "a1"]);
    assert_eq!(history[1].sender, Sender::Assistant);
    let ids: Vec<&str> = summaries.iter().map(|s| s.conversation_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(
        pg.conversation_repository.find_name(user.id, &c1).await.unwrap().as_deref(),
        Some("name-c1")
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_conversation_when_deleting_then_reports_removed_rows() {
    let pg = TestPostgres::new().await;
    let user = create_user(&pg, "ali@example.com").await;
    append(&pg, &user, "c1", Sender::User, "q1").await;
    append(&pg, &user, "c1", Sender::Assistant, "a1").await;

    let c1 = ConversationId::parse("c1").unwrap();
    let deleted = pg.conversation_repository.delete_all(user.id, &c1).await.unwrap();

    assert_eq!(deleted, 2);
    assert!(pg.conversation_repository.list_ordered(user.id, &c1).await.unwrap().is_empty());
}
