//! In-memory session arena
//!
//! One lockable entry per session id. Callers take the entry's async mutex
//! for the duration of any mutation, giving single-writer semantics per id
//! without sharing mutable references. Expired entries are reaped by a
//! background sweep task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::Session;

/// Default session time-to-live
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

/// Concurrent map of sessions with per-entry locks
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Mutex<Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Insert a fresh session, returning its id
    pub fn insert(&self, session: Session) -> Uuid {
        let id = session.id;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Handle to one session's lockable entry
    pub fn get(&self, id: &Uuid) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(id).map(|e| Arc::clone(e.value()))
    }

    pub fn remove(&self, id: &Uuid) {
        self.sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle past the TTL. Returns how many were reaped.
    ///
    /// Entries whose lock is currently held are skipped; an in-flight call
    /// counts as activity and the sweep will catch them next round.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::minutes(30));
        let mut reaped = 0;
        self.sessions.retain(|id, entry| {
            match entry.try_lock() {
                Ok(session) => {
                    let keep = now.signed_duration_since(session.touched_at) < ttl;
                    if !keep {
                        debug!(session = %id, "Session expired");
                        reaped += 1;
                    }
                    keep
                }
                Err(_) => true,
            }
        });
        reaped
    }
}

/// Periodic sweep reaping expired sessions
pub fn spawn_session_sweep_task(store: Arc<SessionStore>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let reaped = store.purge_expired();
            if reaped > 0 {
                debug!(reaped = reaped, remaining = store.len(), "Session sweep completed");
            }
        }
    });

    info!(
        interval_secs = interval.as_secs(),
        "Session sweep task started"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.insert(Session::new(serde_json::Value::Null));
        assert!(store.get(&id).is_some());
        assert_eq!(store.len(), 1);
        store.remove(&id);
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_purge_reaps_idle_sessions() {
        let store = SessionStore::new(Duration::from_millis(0));
        let mut stale = Session::new(serde_json::Value::Null);
        stale.touched_at = Utc::now() - chrono::Duration::minutes(5);
        store.insert(stale);
        assert_eq!(store.purge_expired(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_purge_skips_locked_sessions() {
        let store = SessionStore::new(Duration::from_millis(0));
        let mut stale = Session::new(serde_json::Value::Null);
        stale.touched_at = Utc::now() - chrono::Duration::minutes(5);
        let id = store.insert(stale);
        let entry = store.get(&id).unwrap();
        let _guard = entry.lock().await;
        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.len(), 1);
    }
}
