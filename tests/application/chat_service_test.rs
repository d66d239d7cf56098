use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use dadnovin::application::ports::{ConversationRepository, RepositoryError, VectorStore};
use dadnovin::application::services::{
    ChatError, ChatEvent, ChatRequest, ChatService, ChatSettings, ConversationRegistry,
    ConversationService, RegistryConfig, RetrievalService,
};
use dadnovin::domain::{
    ConversationId, ConversationSummary, Message, MessageRole, Persona, Sender, Turn, UserId,
};
use dadnovin::infrastructure::persistence::{InMemoryConversationRepository, InMemoryVectorStore};

use crate::helpers::{ScriptedLlmClient, Step, TableEmbedder, chunk};

const QUESTION: &str = "مهریه چیست؟";

struct Fixture {
    service: ChatService,
    conversations: Arc<InMemoryConversationRepository>,
    registry: Arc<ConversationRegistry>,
    llm: Arc<ScriptedLlmClient>,
    vector_store: Arc<InMemoryVectorStore>,
}

fn fixture(llm: ScriptedLlmClient) -> Fixture {
    fixture_with(llm, Duration::from_secs(5))
}

fn fixture_with(llm: ScriptedLlmClient, idle_timeout: Duration) -> Fixture {
    let conversations = Arc::new(InMemoryConversationRepository::new());
    let registry = Arc::new(ConversationRegistry::new(RegistryConfig::default()));
    let llm = Arc::new(llm);
    let vector_store = Arc::new(InMemoryVectorStore::new());
    let embedder = Arc::new(TableEmbedder::new(&[(QUESTION, [1.0, 0.0, 0.0])]));
    let retrieval = Arc::new(RetrievalService::new(embedder, vector_store.clone(), 0.1));

    let service = ChatService::new(
        conversations.clone(),
        registry.clone(),
        retrieval,
        llm.clone(),
        ChatSettings {
            stream_idle_timeout: idle_timeout,
            ..ChatSettings::default()
        },
    );

    Fixture {
        service,
        conversations,
        registry,
        llm,
        vector_store,
    }
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        user_id: UserId::new(7),
        conversation_id: ConversationId::parse("c1").unwrap(),
        message: message.to_string(),
        persona: None,
    }
}

async fn run_turn(service: &ChatService, request: ChatRequest) -> Vec<ChatEvent> {
    service.start_turn(request).await.unwrap().collect().await
}

fn senders(turns: &[Turn]) -> Vec<Sender> {
    turns.iter().map(|t| t.sender).collect()
}

#[tokio::test]
async fn given_new_conversation_when_streaming_then_emits_tokens_and_end() {
    let f = fixture(ScriptedLlmClient::replying(&["سلام", " دنیا"]));

    let events = run_turn(&f.service, request("سلام")).await;

    assert_eq!(
        events,
        vec![
            ChatEvent::Token("سلام".to_string()),
            ChatEvent::Token(" دنیا".to_string()),
            ChatEvent::End,
        ]
    );
}

#[tokio::test]
async fn given_new_conversation_when_turn_completes_then_persists_user_and_assistant() {
    let f = fixture(ScriptedLlmClient::replying(&["Hi", " there"]));

    run_turn(&f.service, request("hello")).await;

    let turns = f.conversations.all().await;
    assert_eq!(senders(&turns), vec![Sender::User, Sender::Assistant]);
    assert_eq!(turns[0].message, "hello");
    assert_eq!(turns[1].message, "Hi there");
    assert!(turns[0].name.starts_with('c'));
    assert_eq!(turns[0].name, turns[1].name);
}

#[tokio::test]
async fn given_empty_store_when_streaming_then_sends_system_prompt_and_augmented_question() {
    let f = fixture(ScriptedLlmClient::replying(&["ok"]));

    run_turn(&f.service, request("hello")).await;

    let requests = f.llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        vec![
            Message::system(Persona::Menu.system_prompt()),
            Message::augmented_question("hello", ""),
        ]
    );
}

#[tokio::test]
async fn given_matching_chunks_when_streaming_then_question_carries_retrieved_context() {
    let f = fixture(ScriptedLlmClient::replying(&["ok"]));
    f.vector_store
        .replace(vec![
            chunk("ماده ۱۰۸۲ قانون مدنی", [1.0, 0.0, 0.0]),
            chunk("unrelated", [0.0, 1.0, 0.0]),
        ])
        .await
        .unwrap();

    run_turn(&f.service, request(QUESTION)).await;

    let sent = f.llm.requests().remove(0);
    let last = sent.last().unwrap();
    assert_eq!(last.role, MessageRole::User);
    assert_eq!(
        last.content,
        format!(
            "name: User - question: {}\n\nRelevant context:\nماده ۱۰۸۲ قانون مدنی",
            QUESTION
        )
    );
}

#[tokio::test]
async fn given_cached_conversation_when_second_turn_then_history_is_not_duplicated() {
    let f = fixture(ScriptedLlmClient::replying(&["answer"]));

    run_turn(&f.service, request("q1")).await;
    run_turn(&f.service, request("q2")).await;

    let second = f.llm.requests().remove(1);
    assert_eq!(
        second,
        vec![
            Message::system(Persona::Menu.system_prompt()),
            Message::augmented_question("q1", ""),
            Message::assistant("answer"),
            Message::augmented_question("q2", ""),
        ]
    );
}

#[tokio::test]
async fn given_durable_history_when_registry_is_cold_then_replays_without_current_question() {
    let f = fixture(ScriptedLlmClient::replying(&["a2"]));
    let user_id = UserId::new(7);
    let conversation_id = ConversationId::parse("c1").unwrap();
    for (sender, text) in [(Sender::User, "q1"), (Sender::Assistant, "a1")] {
        f.conversations
            .append(&Turn::new(
                user_id,
                conversation_id.clone(),
                sender,
                text.to_string(),
                "c100".to_string(),
            ))
            .await
            .unwrap();
    }

    run_turn(&f.service, request("q2")).await;

    let sent = f.llm.requests().remove(0);
    assert_eq!(
        sent,
        vec![
            Message::system(Persona::Menu.system_prompt()),
            Message::user("q1"),
            Message::assistant("a1"),
            Message::augmented_question("q2", ""),
        ]
    );
    let turns = f.conversations.all().await;
    assert_eq!(turns.len(), 4);
    assert!(turns.iter().all(|t| t.name == "c100"));
}

#[tokio::test]
async fn given_persona_when_first_turn_then_uses_persona_system_prompt() {
    let f = fixture(ScriptedLlmClient::replying(&["ok"]));

    run_turn(
        &f.service,
        ChatRequest {
            persona: Some(Persona::Arbitrator),
            ..request("hello")
        },
    )
    .await;

    let sent = f.llm.requests().remove(0);
    assert_eq!(sent[0], Message::system(Persona::Arbitrator.system_prompt()));
}

#[tokio::test]
async fn given_blank_message_when_starting_turn_then_rejects_without_side_effects() {
    let f = fixture(ScriptedLlmClient::replying(&["ok"]));

    let result = f.service.start_turn(request("   ")).await;

    assert!(matches!(result, Err(ChatError::EmptyMessage)));
    assert!(f.conversations.all().await.is_empty());
    assert!(f.registry.is_empty());
    assert_eq!(f.llm.call_count(), 0);
}

#[tokio::test]
async fn given_rejected_completion_when_streaming_then_emits_single_error() {
    let f = fixture(ScriptedLlmClient::rejecting());

    let events = run_turn(&f.service, request("hello")).await;

    assert_eq!(events, vec![ChatEvent::Error]);
    let turns = f.conversations.all().await;
    assert_eq!(senders(&turns), vec![Sender::User]);
}

#[tokio::test]
async fn given_mid_stream_failure_when_streaming_then_emits_error_and_skips_assistant_turn() {
    let f = fixture(ScriptedLlmClient::new(vec![
        Step::Token("first"),
        Step::Token("second"),
        Step::Fail,
        Step::Token("never"),
    ]));

    let events = run_turn(&f.service, request("hello")).await;

    assert_eq!(
        events,
        vec![
            ChatEvent::Token("first".to_string()),
            ChatEvent::Token("second".to_string()),
            ChatEvent::Error,
        ]
    );
    assert_eq!(senders(&f.conversations.all().await), vec![Sender::User]);
}

#[tokio::test]
async fn given_stalled_upstream_when_idle_timeout_elapses_then_emits_error() {
    let f = fixture_with(
        ScriptedLlmClient::new(vec![Step::Token("a"), Step::Stall]),
        Duration::from_millis(50),
    );

    let events = tokio::time::timeout(
        Duration::from_secs(5),
        run_turn(&f.service, request("hello")),
    )
    .await
    .unwrap();

    assert_eq!(events, vec![ChatEvent::Token("a".to_string()), ChatEvent::Error]);
    assert_eq!(senders(&f.conversations.all().await), vec![Sender::User]);
}

#[tokio::test]
async fn given_failed_turn_when_next_turn_runs_then_conversation_is_still_usable() {
    let f = fixture(ScriptedLlmClient::new(vec![Step::Fail]));

    let first = run_turn(&f.service, request("q1")).await;
    let second = run_turn(&f.service, request("q2")).await;

    assert_eq!(first, vec![ChatEvent::Error]);
    assert_eq!(second, vec![ChatEvent::Error]);
    assert_eq!(f.llm.call_count(), 2);
}

#[tokio::test]
async fn given_upstream_that_never_responds_when_streaming_then_emits_error_after_timeout() {
    let f = fixture_with(ScriptedLlmClient::unresponsive(), Duration::from_millis(50));

    let events = tokio::time::timeout(
        Duration::from_secs(5),
        run_turn(&f.service, request("hello")),
    )
    .await
    .unwrap();

    assert_eq!(events, vec![ChatEvent::Error]);
    assert_eq!(senders(&f.conversations.all().await), vec![Sender::User]);
}

/// Turn storage whose history reads take a while, widening the hydration window.
struct SlowHistory {
    inner: Arc<InMemoryConversationRepository>,
    delay: Duration,
}

#[async_trait]
impl ConversationRepository for SlowHistory {
    async fn append(&self, turn: &Turn) -> Result<(), RepositoryError> {
        self.inner.append(turn).await
    }

    async fn list_ordered(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Vec<Turn>, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_ordered(user_id, conversation_id).await
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        self.inner.list_conversations(user_id).await
    }

    async fn find_name(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, RepositoryError> {
        self.inner.find_name(user_id, conversation_id).await
    }

    async fn delete_all(
        &self,
        user_id: UserId,
        conversation_id: &ConversationId,
    ) -> Result<u64, RepositoryError> {
        self.inner.delete_all(user_id, conversation_id).await
    }
}

#[tokio::test]
async fn given_two_turns_racing_on_new_conversation_when_hydrating_then_each_sees_only_its_own_question() {
    let stored = Arc::new(InMemoryConversationRepository::new());
    let llm = Arc::new(ScriptedLlmClient::replying(&["answer"]));
    let retrieval = Arc::new(RetrievalService::new(
        Arc::new(TableEmbedder::new(&[])),
        Arc::new(InMemoryVectorStore::new()),
        0.1,
    ));
    let service = ChatService::new(
        Arc::new(SlowHistory {
            inner: stored.clone(),
            delay: Duration::from_millis(100),
        }),
        Arc::new(ConversationRegistry::new(RegistryConfig::default())),
        retrieval,
        llm.clone(),
        ChatSettings::default(),
    );

    let (first, second) = tokio::join!(run_turn(&service, request("first")), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        run_turn(&service, request("second")).await
    });

    assert_eq!(first.last(), Some(&ChatEvent::End));
    assert_eq!(second.last(), Some(&ChatEvent::End));
    let requests = llm.requests();
    assert_eq!(
        requests[0],
        vec![
            Message::system(Persona::Menu.system_prompt()),
            Message::augmented_question("first", ""),
        ]
    );
    assert_eq!(
        requests[1],
        vec![
            Message::system(Persona::Menu.system_prompt()),
            Message::augmented_question("first", ""),
            Message::assistant("answer"),
            Message::augmented_question("second", ""),
        ]
    );
    let stored: Vec<(Sender, String)> = stored
        .all()
        .await
        .into_iter()
        .map(|t| (t.sender, t.message))
        .collect();
    assert_eq!(
        stored,
        vec![
            (Sender::User, "first".to_string()),
            (Sender::Assistant, "answer".to_string()),
            (Sender::User, "second".to_string()),
            (Sender::Assistant, "answer".to_string()),
        ]
    );
}

#[tokio::test]
async fn given_turn_in_flight_when_conversation_deleted_then_reply_is_deleted_too() {
    let f = fixture(ScriptedLlmClient::replying(&["late", " reply"]));
    let conversations = ConversationService::new(f.conversations.clone(), f.registry.clone());
    let conversation_id = ConversationId::parse("c1").unwrap();

    let stream = f.service.start_turn(request("hello")).await.unwrap();
    let (deleted, events) = tokio::join!(
        conversations.delete_conversation(UserId::new(7), &conversation_id),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            stream.collect::<Vec<_>>().await
        }
    );

    assert_eq!(events.last(), Some(&ChatEvent::End));
    assert_eq!(deleted.unwrap(), 2);
    assert!(f.conversations.all().await.is_empty());
    assert!(f
        .conversations
        .list_conversations(UserId::new(7))
        .await
        .unwrap()
        .is_empty());
    assert!(f.registry.is_empty());
}
