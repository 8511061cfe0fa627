//! Server-side session storage shared by both services.
//!
//! Sessions are keyed by a digest of their id, expire `ttl` after their last
//! renewal, and behave as absent once expired. Every mutation holds the store
//! lock for its whole duration, so per-session compare-and-set is atomic.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use tracing::{event, Level};

use crate::core::types::{HashedSessionId, SessionId};
use crate::error::Error;
use crate::util::{hash::hash_without_salt, random::FromRandom};

#[derive(Debug, Clone)]
pub struct Session<S> {
    pub state: S,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

impl<S> Session<S> {
    fn new(state: S, ttl: Duration) -> Self {
        let now = SystemTime::now();
        Self {
            state,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    fn is_expired(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }

    fn renew(&mut self, ttl: Duration) {
        self.expires_at = SystemTime::now() + ttl;
    }
}

#[derive(Debug)]
pub struct SessionStore<S> {
    ttl: Duration,
    sessions: Mutex<HashMap<HashedSessionId, Session<S>>>,
}

impl<S: Clone> SessionStore<S> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, state: S) -> SessionId {
        let id = SessionId::from_random();
        self.sessions
            .lock()
            .insert(hash_without_salt(&id), Session::new(state, self.ttl));
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<Session<S>> {
        let key: HashedSessionId = hash_without_salt(id);
        let mut sessions = self.sessions.lock();
        match sessions.get(&key) {
            Some(s) if s.is_expired(SystemTime::now()) => {
                sessions.remove(&key);
                None
            }
            Some(s) => Some(s.clone()),
            None => None,
        }
    }

    /// Replaces the state of a live session and renews it.
    pub fn set(&self, id: &SessionId, state: S) -> Result<(), Error> {
        self.update(id, |current| *current = state)
            .ok_or(Error::SessionExpired)
    }

    /// Runs `f` against a live session's state under the store lock and
    /// renews the session. Returns `None` when the session is absent.
    pub fn update<R>(&self, id: &SessionId, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let key: HashedSessionId = hash_without_salt(id);
        let mut sessions = self.sessions.lock();
        let now = SystemTime::now();

        if sessions.get(&key).map_or(false, |s| s.is_expired(now)) {
            sessions.remove(&key);
            return None;
        }

        let session = sessions.get_mut(&key)?;
        let result = f(&mut session.state);
        session.renew(self.ttl);
        Some(result)
    }

    /// Stores `state` in the given session when it is still live, otherwise
    /// in a freshly created one. Returns the id that now holds the state.
    pub fn upsert(&self, id: Option<&SessionId>, state: S) -> SessionId {
        if let Some(id) = id {
            let key: HashedSessionId = hash_without_salt(id);
            let mut sessions = self.sessions.lock();
            if let Some(session) = sessions.get_mut(&key) {
                if !session.is_expired(SystemTime::now()) {
                    session.state = state;
                    session.renew(self.ttl);
                    return id.clone();
                }
            }
        }
        self.create(state)
    }

    pub fn destroy(&self, id: &SessionId) -> bool {
        let key: HashedSessionId = hash_without_salt(id);
        self.sessions.lock().remove(&key).is_some()
    }

    /// Drops every expired session. Returns how many were removed.
    pub fn clean_up(&self) -> usize {
        let now = SystemTime::now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let removed = before - sessions.len();
        if removed > 0 {
            event!(Level::DEBUG, removed, "Purged expired sessions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store() -> SessionStore<u32> {
        SessionStore::new(Duration::from_secs(30))
    }

    #[test]
    fn create_then_get() {
        let store = store();
        let id = store.create(7);
        let session = store.get(&id).unwrap();
        assert_eq!(session.state, 7);
        assert!(session.expires_at > session.created_at);
    }

    #[test]
    fn unknown_id_is_not_found() {
        assert!(store().get(&SessionId("nope".to_string())).is_none());
    }

    #[test]
    fn set_overwrites_and_requires_live_session() {
        let store = store();
        let id = store.create(1);
        store.set(&id, 2).unwrap();
        assert_eq!(store.get(&id).unwrap().state, 2);

        let missing = SessionId("missing".to_string());
        assert!(matches!(store.set(&missing, 3), Err(Error::SessionExpired)));
    }

    #[test]
    fn destroy_removes() {
        let store = store();
        let id = store.create(1);
        assert!(store.destroy(&id));
        assert!(store.get(&id).is_none());
        assert!(!store.destroy(&id));
    }

    #[test]
    fn expired_session_is_not_found() {
        let store = SessionStore::new(Duration::from_millis(20));
        let id = store.create(1);
        std::thread::sleep(Duration::from_millis(40));

        assert!(store.get(&id).is_none());
        assert!(store.update(&id, |s| *s += 1).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn renewal_extends_lifetime() {
        let store = SessionStore::new(Duration::from_millis(200));
        let id = store.create(0);
        for _ in 0..4 {
            std::thread::sleep(Duration::from_millis(80));
            store.update(&id, |s| *s += 1).unwrap();
        }
        assert_eq!(store.get(&id).unwrap().state, 4);
    }

    #[test]
    fn upsert_reuses_live_and_replaces_dead() {
        let store = SessionStore::new(Duration::from_millis(20));
        let id = store.create(1);
        let same = store.upsert(Some(&id), 2);
        assert!(same == id);

        std::thread::sleep(Duration::from_millis(40));
        let fresh = store.upsert(Some(&id), 3);
        assert!(fresh != id);
        assert_eq!(store.get(&fresh).unwrap().state, 3);

        let created = store.upsert(None, 4);
        assert_eq!(store.get(&created).unwrap().state, 4);
    }

    #[test]
    fn clean_up_purges_expired() {
        let store = SessionStore::new(Duration::from_millis(20));
        store.create(1);
        store.create(2);
        std::thread::sleep(Duration::from_millis(40));
        let live = store.create(3);

        assert_eq!(store.clean_up(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get(&live).is_some());
    }

    #[test]
    fn concurrent_take_happens_once() {
        let store = Arc::new(SessionStore::new(Duration::from_secs(30)));
        let id = store.create(Some(42u32));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || store.update(&id, |s| s.take()).flatten())
            })
            .collect();

        let taken: Vec<u32> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(taken, vec![42]);
    }
}
