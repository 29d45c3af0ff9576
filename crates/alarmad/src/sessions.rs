//! Bounded per-session conversational memory.
//!
//! Each session id owns one record mutated only by requests bearing that
//! id; a map-level lock protects the rare create-on-first-message case.
//! The table is bounded: LRU eviction on capacity plus TTL expiry on idle
//! sessions, so the store cannot grow without limit.

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Transcript entries kept per session. Best-effort memory, not required
/// for correctness.
pub const MAX_TRANSCRIPT_ENTRIES: usize = 50;

/// Conversation state machine positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvState {
    Idle,
    AwaitingAlarmNumber,
    AwaitingElementName,
}

impl std::fmt::Display for ConvState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvState::Idle => write!(f, "idle"),
            ConvState::AwaitingAlarmNumber => write!(f, "awaiting_alarm_number"),
            ConvState::AwaitingElementName => write!(f, "awaiting_element_name"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Per-user conversational memory.
#[derive(Debug)]
pub struct ConversationSession {
    pub state: ConvState,
    pub pending_alarm_number: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    last_seen: Instant,
}

impl ConversationSession {
    fn fresh() -> Self {
        Self {
            state: ConvState::Idle,
            pending_alarm_number: None,
            transcript: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    /// Append to the in-memory conversation log, dropping the oldest entry
    /// once the cap is reached.
    pub fn record(&mut self, speaker: Speaker, text: &str) {
        if self.transcript.len() >= MAX_TRANSCRIPT_ENTRIES {
            self.transcript.remove(0);
        }
        self.transcript.push(TranscriptEntry {
            speaker,
            text: text.to_string(),
            at: Utc::now(),
        });
    }
}

/// LRU + TTL bounded session table.
pub struct SessionStore {
    sessions: Mutex<LruCache<String, ConversationSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Run `f` against the session for `id`, creating a fresh one on first
    /// message or after TTL expiry. The store lock is held for the whole
    /// transition, which keeps same-id requests strictly sequential.
    pub async fn update<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut ConversationSession) -> R,
    ) -> R {
        let mut sessions = self.sessions.lock().await;

        let expired = sessions
            .get(id)
            .map(|s| s.last_seen.elapsed() >= self.ttl)
            .unwrap_or(false);
        if expired {
            sessions.pop(id);
        }

        let session =
            sessions.get_or_insert_mut(id.to_string(), ConversationSession::fresh);
        session.last_seen = Instant::now();
        f(session)
    }

    /// Current state of a session without touching its recency.
    pub async fn state_of(&self, id: &str) -> Option<ConvState> {
        self.sessions.lock().await.peek(id).map(|s| s.state)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop every session idle past the TTL.
    pub async fn prune_expired(&self) {
        let mut sessions = self.sessions.lock().await;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.last_seen.elapsed() >= self.ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            sessions.pop(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_created_on_first_message() {
        let store = SessionStore::new(8, Duration::from_secs(60));
        assert_eq!(store.state_of("u1").await, None);
        store
            .update("u1", |s| s.state = ConvState::AwaitingAlarmNumber)
            .await;
        assert_eq!(
            store.state_of("u1").await,
            Some(ConvState::AwaitingAlarmNumber)
        );
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let store = SessionStore::new(2, Duration::from_secs(60));
        store.update("a", |_| ()).await;
        store.update("b", |_| ()).await;
        store.update("c", |_| ()).await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.state_of("a").await, None);
    }

    #[tokio::test]
    async fn test_ttl_expiry_resets_session() {
        let store = SessionStore::new(8, Duration::from_millis(0));
        store
            .update("u1", |s| {
                s.state = ConvState::AwaitingElementName;
                s.pending_alarm_number = Some("1003".to_string());
            })
            .await;
        // TTL of zero: the next touch sees an expired session and resets it.
        let state = store.update("u1", |s| s.state).await;
        assert_eq!(state, ConvState::Idle);
    }

    #[tokio::test]
    async fn test_transcript_is_bounded() {
        let store = SessionStore::new(8, Duration::from_secs(60));
        store
            .update("u1", |s| {
                for i in 0..(MAX_TRANSCRIPT_ENTRIES + 10) {
                    s.record(Speaker::User, &format!("mensaje {i}"));
                }
                assert_eq!(s.transcript.len(), MAX_TRANSCRIPT_ENTRIES);
            })
            .await;
    }
}
