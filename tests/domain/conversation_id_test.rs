use dadnovin::domain::{ConversationId, ConversationKey, UserId};

#[test]
fn given_padded_id_when_parsing_then_trims() {
    let id = ConversationId::parse("  abc-123 ").unwrap();
    assert_eq!(id.as_str(), "abc-123");
}

#[test]
fn given_blank_id_when_parsing_then_fails() {
    assert!(ConversationId::parse("   ").is_err());
}

#[test]
fn given_overlong_id_when_parsing_then_fails() {
    let raw = "x".repeat(129);
    assert!(ConversationId::parse(&raw).is_err());
}

#[test]
fn given_key_when_displayed_then_joins_user_and_conversation() {
    let key = ConversationKey::new(UserId::new(7), ConversationId::parse("c1").unwrap());
    assert_eq!(key.to_string(), "7-c1");
}

#[test]
fn given_same_conversation_for_two_users_when_keyed_then_keys_differ() {
    let id = ConversationId::parse("shared").unwrap();
    let a = ConversationKey::new(UserId::new(1), id.clone());
    let b = ConversationKey::new(UserId::new(2), id);
    assert_ne!(a, b);
}
