use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dadnovin::application::services::{ConversationRegistry, RegistryConfig};
use dadnovin::domain::{ConversationId, ConversationKey, Message, MessageRole, Persona, UserId};
use tokio_util::sync::CancellationToken;

fn key(user: i64, conversation: &str) -> ConversationKey {
    ConversationKey::new(UserId::new(user), ConversationId::parse(conversation).unwrap())
}

fn registry(ttl_secs: u64, max_messages: usize) -> ConversationRegistry {
    ConversationRegistry::new(RegistryConfig {
        ttl: Duration::from_secs(ttl_secs),
        reap_interval: Duration::from_secs(60),
        max_messages,
    })
}

async fn empty_history() -> Result<Vec<Message>, Infallible> {
    Ok(Vec::new())
}

#[tokio::test]
async fn given_no_durable_turns_when_hydrating_repeatedly_then_holds_only_system_prompt() {
    let registry = registry(3600, 50);
    let k = key(1, "c1");

    for _ in 0..3 {
        let handle = registry
            .acquire(&k, Persona::Menu, empty_history)
            .await
            .unwrap();
        assert_eq!(handle.messages().len(), 1);
        assert_eq!(handle.messages()[0].role, MessageRole::System);
    }
}

#[tokio::test]
async fn given_durable_turns_when_hydrating_then_replays_after_system_prompt() {
    let registry = registry(3600, 50);
    let handle = registry
        .acquire(&key(1, "c1"), Persona::LegalAdvisor, || async {
            Ok::<_, Infallible>(vec![Message::user("q1"), Message::assistant("a1")])
        })
        .await
        .unwrap();

    let messages = handle.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], Message::system(Persona::LegalAdvisor.system_prompt()));
    assert_eq!(messages[1], Message::user("q1"));
    assert_eq!(messages[2], Message::assistant("a1"));
}

#[tokio::test]
async fn given_hydrated_entry_when_acquired_again_then_replay_is_not_called() {
    let registry = registry(3600, 50);
    let calls = AtomicUsize::new(0);
    let k = key(1, "c1");

    for _ in 0..2 {
        let mut handle = registry
            .acquire(&k, Persona::Menu, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Vec::new())
            })
            .await
            .unwrap();
        handle.push(Message::user("hi"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let handle = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
    assert_eq!(handle.messages().len(), 3);
}

#[tokio::test]
async fn given_failed_replay_when_acquired_again_then_retries_hydration() {
    let registry = registry(3600, 50);
    let k = key(1, "c1");

    let failed = registry
        .acquire(&k, Persona::Menu, || async { Err::<Vec<Message>, _>("db down") })
        .await;
    assert!(failed.is_err());

    let handle = registry
        .acquire(&k, Persona::Menu, || async {
            Ok::<_, &str>(vec![Message::user("q")])
        })
        .await
        .unwrap();
    assert_eq!(handle.messages().len(), 2);
}

#[tokio::test]
async fn given_list_over_limit_when_pushing_then_keeps_system_prompt_and_latest() {
    let registry = registry(3600, 5);
    let mut handle = registry
        .acquire(&key(1, "c1"), Persona::Menu, empty_history)
        .await
        .unwrap();

    for i in 0..10 {
        handle.push(Message::user(format!("m{}", i)));
    }

    let messages = handle.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0].role, MessageRole::System);
    let tail: Vec<&str> = messages[1..].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(tail, vec!["m6", "m7", "m8", "m9"]);
}

#[tokio::test]
async fn given_long_history_when_hydrating_then_trims_immediately() {
    let registry = registry(3600, 4);
    let handle = registry
        .acquire(&key(1, "c1"), Persona::Menu, || async {
            Ok::<_, Infallible>((0..10).map(|i| Message::user(i.to_string())).collect())
        })
        .await
        .unwrap();

    assert_eq!(handle.messages().len(), 4);
    assert_eq!(handle.messages()[0].role, MessageRole::System);
    assert_eq!(handle.messages()[3].content, "9");
}

#[tokio::test(start_paused = true)]
async fn given_idle_entry_when_reaping_after_ttl_then_entry_is_removed() {
    let registry = registry(60, 50);
    let k = key(1, "c1");
    drop(registry.acquire(&k, Persona::Menu, empty_history).await.unwrap());

    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(registry.reap(), 1);
    assert!(!registry.contains(&k));
}

#[tokio::test(start_paused = true)]
async fn given_touched_entry_when_reaping_then_entry_survives() {
    let registry = registry(60, 50);
    let idle = key(1, "idle");
    let active = key(1, "active");
    drop(registry.acquire(&idle, Persona::Menu, empty_history).await.unwrap());
    drop(registry.acquire(&active, Persona::Menu, empty_history).await.unwrap());

    tokio::time::advance(Duration::from_secs(40)).await;
    drop(registry.acquire(&active, Persona::Menu, empty_history).await.unwrap());
    tokio::time::advance(Duration::from_secs(40)).await;

    assert_eq!(registry.reap(), 1);
    assert!(registry.contains(&active));
    assert!(!registry.contains(&idle));
}

#[tokio::test(start_paused = true)]
async fn given_idle_entry_held_by_running_turn_when_reaping_then_entry_is_kept() {
    let registry = registry(60, 50);
    let k = key(1, "c1");
    let handle = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(registry.reap(), 0);
    assert!(registry.contains(&k));
    drop(handle);
    assert_eq!(registry.reap(), 1);
}

#[tokio::test(start_paused = true)]
async fn given_running_reaper_when_interval_elapses_then_idle_entries_are_dropped() {
    let registry = Arc::new(ConversationRegistry::new(RegistryConfig {
        ttl: Duration::from_secs(60),
        reap_interval: Duration::from_secs(30),
        max_messages: 50,
    }));
    let k = key(1, "c1");
    drop(registry.acquire(&k, Persona::Menu, empty_history).await.unwrap());

    let shutdown = CancellationToken::new();
    let reaper = registry.spawn_reaper(shutdown.clone());

    tokio::time::sleep(Duration::from_secs(95)).await;
    assert!(registry.is_empty());

    shutdown.cancel();
    reaper.await.unwrap();
}

#[tokio::test]
async fn given_evicted_entry_when_acquired_then_hydrates_again() {
    let registry = registry(3600, 50);
    let k = key(1, "c1");
    let mut handle = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
    handle.push(Message::user("stale"));
    drop(handle);

    registry.evict(&k, || async {}).await;
    assert!(!registry.contains(&k));
    let handle = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
    assert_eq!(handle.messages().len(), 1);
}

#[tokio::test]
async fn given_held_handle_when_same_key_acquired_then_waits_for_release() {
    let registry = Arc::new(registry(3600, 50));
    let k = key(1, "c1");
    let mut first = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();

    let contender = {
        let registry = Arc::clone(&registry);
        let k = k.clone();
        tokio::spawn(async move {
            let handle = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
            handle.messages().len()
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!contender.is_finished());

    first.push(Message::user("q"));
    first.push(Message::assistant("a"));
    drop(first);

    assert_eq!(contender.await.unwrap(), 3);
}

#[tokio::test]
async fn given_held_handle_when_other_key_acquired_then_does_not_wait() {
    let registry = registry(3600, 50);
    let _first = registry
        .acquire(&key(1, "c1"), Persona::Menu, empty_history)
        .await
        .unwrap();

    let other = tokio::time::timeout(
        Duration::from_secs(1),
        registry.acquire(&key(2, "c1"), Persona::Menu, empty_history),
    )
    .await;
    assert!(other.is_ok());
}

#[tokio::test]
async fn given_held_handle_when_evicting_then_cleanup_waits_for_release() {
    let registry = Arc::new(registry(3600, 50));
    let k = key(1, "c1");
    let first = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
    let cleaned = Arc::new(AtomicUsize::new(0));

    let eviction = {
        let registry = Arc::clone(&registry);
        let cleaned = Arc::clone(&cleaned);
        let k = k.clone();
        tokio::spawn(async move {
            registry
                .evict(&k, || async move {
                    cleaned.fetch_add(1, Ordering::SeqCst);
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(cleaned.load(Ordering::SeqCst), 0);

    drop(first);
    eviction.await.unwrap();
    assert_eq!(cleaned.load(Ordering::SeqCst), 1);
    assert!(!registry.contains(&k));
}

#[tokio::test]
async fn given_turn_queued_behind_eviction_when_released_then_starts_from_fresh_entry() {
    let registry = Arc::new(registry(3600, 50));
    let k = key(1, "c1");
    let mut first = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
    first.push(Message::user("deleted question"));

    let eviction = {
        let registry = Arc::clone(&registry);
        let k = k.clone();
        tokio::spawn(async move { registry.evict(&k, || async {}).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let next_turn = {
        let registry = Arc::clone(&registry);
        let k = k.clone();
        tokio::spawn(async move {
            let handle = registry.acquire(&k, Persona::Menu, empty_history).await.unwrap();
            handle.messages().to_vec()
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    drop(first);
    eviction.await.unwrap();
    let messages = next_turn.await.unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::System);
    assert!(registry.contains(&k));
}
