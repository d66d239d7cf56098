use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::{ConversationKey, Message, Persona};

pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_MESSAGES: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    pub ttl: Duration,
    pub reap_interval: Duration,
    pub max_messages: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            reap_interval: DEFAULT_REAP_INTERVAL,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

#[derive(Debug, Default)]
struct ConversationState {
    messages: Vec<Message>,
    hydrated: bool,
    /// Set when the entry leaves the map; lock waiters must resolve the key again.
    detached: bool,
}

struct Entry {
    state: Arc<AsyncMutex<ConversationState>>,
    last_access: Instant,
}

/// In-process cache of live conversations keyed by user and conversation.
///
/// Entries expire after `ttl` without access. Each entry has its own lock, held
/// by a [`ConversationHandle`], so two turns on one conversation run one after
/// the other while unrelated conversations proceed in parallel.
pub struct ConversationRegistry {
    entries: Mutex<HashMap<ConversationKey, Entry>>,
    config: RegistryConfig,
}

impl ConversationRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Resolves the entry for `key`, hydrating it on first use.
    ///
    /// `replay` yields the durable history, oldest first; the persona's system
    /// prompt is put in front of it. A failed replay leaves the entry empty and
    /// the next caller retries.
    pub async fn acquire<F, Fut, E>(
        &self,
        key: &ConversationKey,
        persona: Persona,
        replay: F,
    ) -> Result<ConversationHandle, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Message>, E>>,
    {
        let mut guard = self.lock_attached(key).await;
        if !guard.hydrated {
            let history = replay().await?;
            let mut messages = Vec::with_capacity(history.len() + 1);
            messages.push(Message::system(persona.system_prompt()));
            messages.extend(history);
            guard.messages = messages;
            guard.hydrated = true;
            tracing::debug!(key = %key, messages = guard.messages.len(), "conversation hydrated");
        }

        let mut handle = ConversationHandle {
            key: key.clone(),
            guard,
            max_messages: self.config.max_messages,
        };
        handle.trim();
        Ok(handle)
    }

    /// Runs `cleanup` once no turn holds the conversation, then drops the entry.
    ///
    /// Turns queued behind the cleanup start from a fresh entry.
    pub async fn evict<F, Fut, T>(&self, key: &ConversationKey, cleanup: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut guard = self.lock_attached(key).await;
        let result = cleanup().await;
        guard.detached = true;
        self.detach(key, &guard);
        result
    }

    async fn lock_attached(&self, key: &ConversationKey) -> OwnedMutexGuard<ConversationState> {
        loop {
            let state = {
                let mut entries = self.lock_entries();
                let entry = entries.entry(key.clone()).or_insert_with(|| Entry {
                    state: Arc::new(AsyncMutex::new(ConversationState::default())),
                    last_access: Instant::now(),
                });
                entry.last_access = Instant::now();
                Arc::clone(&entry.state)
            };

            let guard = state.lock_owned().await;
            if !guard.detached {
                return guard;
            }
        }
    }

    fn detach(&self, key: &ConversationKey, guard: &OwnedMutexGuard<ConversationState>) {
        let mut entries = self.lock_entries();
        let same = entries
            .get(key)
            .is_some_and(|entry| Arc::ptr_eq(&entry.state, OwnedMutexGuard::mutex(guard)));
        if same {
            entries.remove(key);
        }
    }

    /// Removes entries idle for longer than the TTL. Returns how many were dropped.
    ///
    /// An entry whose lock is held belongs to a running turn and is kept.
    pub fn reap(&self) -> usize {
        let ttl = self.config.ttl;
        let now = Instant::now();
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| {
            if now.duration_since(entry.last_access) <= ttl {
                return true;
            }
            match entry.state.try_lock() {
                Ok(mut state) => {
                    state.detached = true;
                    false
                }
                Err(_) => true,
            }
        });
        let reaped = before - entries.len();
        if reaped > 0 {
            tracing::info!(reaped, remaining = entries.len(), "reaped idle conversations");
        }
        reaped
    }

    /// Does not count as an access.
    pub fn contains(&self, key: &ConversationKey) -> bool {
        self.lock_entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs [`reap`](Self::reap) every `reap_interval` until `shutdown` fires.
    pub fn spawn_reaper(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = registry.config.reap_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("conversation reaper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        registry.reap();
                    }
                }
            }
        })
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<ConversationKey, Entry>> {
        // The map is only touched by short non-panicking sections.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive access to one conversation's in-memory messages.
pub struct ConversationHandle {
    key: ConversationKey,
    guard: OwnedMutexGuard<ConversationState>,
    max_messages: usize,
}

impl ConversationHandle {
    pub fn messages(&self) -> &[Message] {
        &self.guard.messages
    }

    pub fn push(&mut self, message: Message) {
        self.guard.messages.push(message);
        self.trim();
    }

    /// Keeps the system prompt and the most recent `max_messages - 1` messages.
    fn trim(&mut self) {
        let max = self.max_messages.max(2);
        let messages = &mut self.guard.messages;
        if messages.len() > max {
            let excess = messages.len() - max;
            messages.drain(1..=excess);
            tracing::debug!(key = %self.key, max, "trimmed conversation");
        }
    }
}
