//! Session arena with per-session locking.
//!
//! Sessions live in a map keyed by opaque id. Each entry carries its own
//! async lock: two turns for the same session serialize on it, while turns
//! for different sessions proceed in parallel. There is no global turn
//! lock and no background sweep; idle expiry is evaluated lazily by the
//! orchestrator after checkout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use kedai_core::Timestamp;

use crate::types::{Session, SessionSummary};

type SessionSlot = Arc<tokio::sync::Mutex<Session>>;

/// Arena of conversational sessions.
pub struct SessionStore {
    inner: Mutex<HashMap<String, SessionSlot>>,
    idle_minutes: u32,
}

impl SessionStore {
    pub fn new(idle_minutes: u32) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            idle_minutes,
        }
    }

    /// Idle threshold used for lazy expiry checks.
    pub fn idle_minutes(&self) -> u32 {
        self.idle_minutes
    }

    /// Get or create the slot for a session id.
    ///
    /// The caller locks the returned slot for the duration of the turn,
    /// giving per-session mutual exclusion without blocking other sessions.
    pub fn checkout(&self, id: &str) -> SessionSlot {
        let mut map = self.lock_map();
        map.entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session = %id, "Creating session");
                Arc::new(tokio::sync::Mutex::new(Session::fresh(
                    id.to_string(),
                    Timestamp::now(),
                )))
            })
            .clone()
    }

    /// Whether a session exists.
    pub fn contains(&self, id: &str) -> bool {
        self.lock_map().contains_key(id)
    }

    /// Remove a session entirely (explicit clear from the transport layer).
    /// Returns whether it existed.
    pub fn clear(&self, id: &str) -> bool {
        let existed = self.lock_map().remove(id).is_some();
        if existed {
            tracing::debug!(session = %id, "Session cleared");
        }
        existed
    }

    /// Snapshot a session by id.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let slot = self.lock_map().get(id).cloned()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    /// Summaries of all sessions. Waits briefly on sessions mid-turn.
    pub async fn summaries(&self) -> Vec<SessionSummary> {
        let slots: Vec<SessionSlot> = self.lock_map().values().cloned().collect();
        let mut summaries = Vec::with_capacity(slots.len());
        for slot in slots {
            let session = slot.lock().await;
            summaries.push(SessionSummary {
                id: session.id.clone(),
                turns: session.history.len(),
                created_at: session.created_at,
                last_active_at: session.last_active_at,
            });
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Lock the map, recovering from poisoning. The map holds only `Arc`s,
    /// so a panicked holder cannot leave it half-updated.
    fn lock_map(&self) -> MutexGuard<'_, HashMap<String, SessionSlot>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Session map lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, Intent};

    #[tokio::test]
    async fn test_checkout_creates_session() {
        let store = SessionStore::new(30);
        let slot = store.checkout("s1");
        let session = slot.lock().await;
        assert_eq!(session.id, "s1");
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_reuses_existing() {
        let store = SessionStore::new(30);
        let a = store.checkout("s1");
        let b = store.checkout("s1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_distinct_ids_get_distinct_slots() {
        let store = SessionStore::new(30);
        let a = store.checkout("s1");
        let b = store.checkout("s2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_clear_removes_session() {
        let store = SessionStore::new(30);
        store.checkout("s1");
        assert!(store.contains("s1"));
        assert!(store.clear("s1"));
        assert!(!store.contains("s1"));
        assert!(!store.clear("s1"));
    }

    #[tokio::test]
    async fn test_get_snapshot() {
        let store = SessionStore::new(30);
        let slot = store.checkout("s1");
        {
            let mut session = slot.lock().await;
            session.record_turn(
                "hi",
                Intent::Greeting,
                ActionKind::AnsweredDirectly,
                None,
                10,
                Timestamp::now(),
            );
        }
        let snapshot = store.get("s1").await.unwrap();
        assert_eq!(snapshot.history.len(), 1);
        assert!(store.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_summaries() {
        let store = SessionStore::new(30);
        store.checkout("a");
        store.checkout("b");
        let summaries = store.summaries().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, "a");
        assert_eq!(summaries[1].id, "b");
        assert_eq!(summaries[0].turns, 0);
    }

    #[tokio::test]
    async fn test_per_session_lock_serializes_same_id() {
        let store = Arc::new(SessionStore::new(30));
        let slot = store.checkout("s1");

        let guard = slot.lock().await;
        // A second checkout returns the same slot; locking it would block.
        let again = store.checkout("s1");
        assert!(again.try_lock().is_err());
        drop(guard);
        assert!(again.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block_each_other() {
        let store = SessionStore::new(30);
        let a = store.checkout("a");
        let b = store.checkout("b");
        let _guard_a = a.lock().await;
        // Holding a's lock must not block b.
        assert!(b.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_checkout_distinct_sessions() {
        let store = Arc::new(SessionStore::new(30));
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let slot = store.checkout(&format!("session-{}", i));
                let mut session = slot.lock().await;
                session.record_turn(
                    "hello",
                    Intent::Greeting,
                    ActionKind::AnsweredDirectly,
                    None,
                    10,
                    Timestamp::now(),
                );
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.summaries().await.len(), 10);
    }
}
