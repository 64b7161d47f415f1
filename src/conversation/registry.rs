//! In-memory registry of live conversations

use super::ConversationState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Longest gap between sweeps, whatever the idle TTL
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A conversation and its id.
///
/// The mutex is only held for the synchronous state mutations, never across
/// a network call; `awaiting_response` is what keeps requests single-flight.
#[derive(Debug)]
pub struct Conversation {
    id: String,
    pub state: Mutex<ConversationState>,
    last_touched: std::sync::Mutex<Instant>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_state(id, ConversationState::new())
    }

    pub fn with_state(id: impl Into<String>, state: ConversationState) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(state),
            last_touched: std::sync::Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn touch(&self) {
        if let Ok(mut last) = self.last_touched.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self, now: Instant) -> Duration {
        self.last_touched
            .lock()
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(*last))
    }

    /// Idle past the TTL with no reply outstanding. A conversation whose
    /// state is locked is in use and never evictable.
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        if self.idle_for(now) < ttl {
            return false;
        }
        self.state
            .try_lock()
            .is_ok_and(|state| !state.is_awaiting_response())
    }
}

/// Conversations live while they are in use; nothing is persisted.
///
/// Every lookup refreshes a conversation. Those left idle longer than the TTL
/// are dropped by [`ConversationRegistry::evict_idle`].
#[derive(Debug)]
pub struct ConversationRegistry {
    conversations: RwLock<HashMap<String, Arc<Conversation>>>,
    idle_ttl: Duration,
}

impl ConversationRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Create a new conversation seeded with the greeting
    pub async fn create(&self) -> Arc<Conversation> {
        let id = uuid::Uuid::new_v4().to_string();
        let conversation = Arc::new(Conversation::new(id.clone()));
        self.conversations
            .write()
            .await
            .insert(id.clone(), conversation.clone());
        tracing::debug!(conv_id = %id, "Created conversation");
        conversation
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Conversation>> {
        let conversation = self.conversations.read().await.get(id).cloned()?;
        conversation.touch();
        Some(conversation)
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Drop conversations idle longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, conversation| !conversation.is_expired(self.idle_ttl, now));
        before - conversations.len()
    }

    /// Sweep idle conversations in the background for the life of the process
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let period = registry.idle_ttl.min(MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle().await;
                if evicted > 0 {
                    let remaining = registry.len().await;
                    tracing::info!(
                        evicted,
                        remaining,
                        "Evicted idle conversations"
                    );
                }
            }
        })
    }
}
