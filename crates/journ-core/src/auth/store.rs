//! Single source of truth for "is the user signed in, and with what token".

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::storage::SessionStorage;
use super::Session;

/// Where the session lifecycle currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Persisted storage has not been read yet
    Unknown,
    Anonymous,
    Authenticated(Session),
}

/// Point-in-time view of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// True until `restore` has finished reading persisted storage
    pub is_loading: bool,
    pub session: Option<Session>,
    /// Bumped on every change of the live session
    pub generation: u64,
}

impl SessionSnapshot {
    pub fn auth_state(&self) -> AuthState {
        match (&self.session, self.is_loading) {
            (Some(session), _) => AuthState::Authenticated(session.clone()),
            (None, true) => AuthState::Unknown,
            (None, false) => AuthState::Anonymous,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().and_then(Session::access_token)
    }
}

struct Inner {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionSnapshot>,
    /// Serializes mutations so memory and storage change together
    writes: Mutex<()>,
}

/// Cloneable handle to the shared session state.
///
/// Reads are cheap snapshots. Only `restore`, `sign_in` and `sign_out`
/// mutate, and they write through to the injected storage. Storage failures
/// are logged and never surface to callers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let state = watch::Sender::new(SessionSnapshot {
            is_loading: true,
            session: None,
            generation: 0,
        });
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                writes: Mutex::new(()),
            }),
        }
    }

    /// Read the persisted session. A failed read counts as "no session".
    pub async fn restore(&self) -> SessionSnapshot {
        let _guard = self.inner.writes.lock().await;

        let stored = match self.inner.storage.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session, starting signed out");
                None
            }
        };
        debug!(has_session = stored.is_some(), "Session restored");

        self.inner.state.send_modify(|state| {
            if state.session != stored {
                state.generation += 1;
            }
            state.session = stored;
            state.is_loading = false;
        });
        self.snapshot()
    }

    /// Replace the live session with `session` and persist it.
    pub async fn sign_in(&self, session: Session) {
        let _guard = self.inner.writes.lock().await;

        self.inner.state.send_modify(|state| {
            state.session = Some(session.clone());
            state.is_loading = false;
            state.generation += 1;
        });

        if let Err(e) = self.inner.storage.save(&session).await {
            warn!(error = %e, "Failed to persist session, it will not survive a restart");
        }
        info!(user_id = ?session.user_id(), "Signed in");
    }

    /// Drop the live session and the persisted copy. Calling this while
    /// signed out leaves the state untouched.
    pub async fn sign_out(&self) {
        self.clear(None).await;
    }

    /// Sign out only if the session is still the one seen at `generation`.
    /// Returns false, changing nothing, when the session moved on since.
    pub async fn sign_out_if_current(&self, generation: u64) -> bool {
        self.clear(Some(generation)).await
    }

    async fn clear(&self, expected: Option<u64>) -> bool {
        let _guard = self.inner.writes.lock().await;

        if let Some(generation) = expected {
            let current = self.generation();
            if current != generation {
                debug!(expected = generation, current, "Session changed, not signing out");
                return false;
            }
        }

        let mut was_signed_in = false;
        self.inner.state.send_if_modified(|state| {
            let was_loading = std::mem::replace(&mut state.is_loading, false);
            if state.session.take().is_some() {
                state.generation += 1;
                was_signed_in = true;
            }
            was_loading || was_signed_in
        });

        if let Err(e) = self.inner.storage.clear().await {
            warn!(error = %e, "Failed to clear stored session");
        }
        if was_signed_in {
            info!("Signed out");
        }
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().session.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state.borrow().access_token().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().session.is_some()
    }

    pub fn auth_state(&self) -> AuthState {
        self.inner.state.borrow().auth_state()
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    /// Watch for session changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Wait until `restore` has finished, returning the state it produced
    pub async fn restored(&self) -> SessionSnapshot {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let snapshot = match rx.wait_for(|state| !state.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::{MemoryStorage, StorageError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> Session {
        Session::new(json!({"access_token": "abc", "user_id": "1"}))
    }

    /// Storage whose every operation fails
    #[derive(Default)]
    struct BrokenStorage {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SessionStorage for BrokenStorage {
        async fn load(&self) -> Result<Option<Session>, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("disk on fire").into())
        }

        async fn save(&self, _session: &Session) -> Result<(), StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("disk on fire").into())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    #[test]
    fn test_starts_unknown() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.is_loading());
        assert_eq!(store.auth_state(), AuthState::Unknown);
        assert_eq!(store.session(), None);
    }

    #[tokio::test]
    async fn test_restore_with_persisted_session() {
        let store = SessionStore::new(Arc::new(MemoryStorage::with_session(sample())));
        let restored = store.restore().await;

        assert!(!restored.is_loading);
        assert_eq!(restored.session, Some(sample()));
        assert_eq!(store.auth_state(), AuthState::Authenticated(sample()));
    }

    #[tokio::test]
    async fn test_restore_without_persisted_session() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let restored = store.restore().await;

        assert!(!restored.is_loading);
        assert_eq!(restored.session, None);
        assert_eq!(store.auth_state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_restore_read_failure_is_anonymous() {
        let store = SessionStore::new(Arc::new(BrokenStorage::default()));
        let restored = store.restore().await;

        assert!(!restored.is_loading);
        assert_eq!(store.auth_state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_in_round_trip_then_sign_out() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.restore().await;

        store.sign_in(sample()).await;
        assert_eq!(store.session(), Some(sample()));
        assert_eq!(store.access_token().as_deref(), Some("abc"));
        assert_eq!(storage.load().await.unwrap(), Some(sample()));

        store.sign_out().await;
        assert_eq!(store.session(), None);
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_in_survives_restart() {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).sign_in(sample()).await;

        let next_run = SessionStore::new(storage);
        assert_eq!(next_run.restore().await.session, Some(sample()));
    }

    #[tokio::test]
    async fn test_sign_in_replaces_without_merging() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        store
            .sign_in(Session::new(json!({"access_token": "old", "user_id": "1", "extra": true})))
            .await;
        store
            .sign_in(Session::new(json!({"access_token": "new", "user_id": "2"})))
            .await;

        let session = store.session().unwrap();
        assert_eq!(session.payload(), &json!({"access_token": "new", "user_id": "2"}));
    }

    #[tokio::test]
    async fn test_sign_out_is_idempotent() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        store.restore().await;
        let before = store.generation();

        store.sign_out().await;
        store.sign_out().await;
        assert_eq!(store.auth_state(), AuthState::Anonymous);
        assert_eq!(store.generation(), before);

        store.sign_in(sample()).await;
        store.sign_out().await;
        store.sign_out().await;
        assert_eq!(store.auth_state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_sign_out_before_restore() {
        let store = SessionStore::new(Arc::new(MemoryStorage::with_session(sample())));
        store.sign_out().await;
        assert_eq!(store.auth_state(), AuthState::Anonymous);
        // The persisted copy is gone too, so a later restore stays anonymous
        assert_eq!(store.restore().await.session, None);
    }

    #[tokio::test]
    async fn test_storage_write_failures_are_swallowed() {
        let storage = Arc::new(BrokenStorage::default());
        let store = SessionStore::new(storage.clone());

        store.sign_in(sample()).await;
        assert_eq!(store.session(), Some(sample()));

        store.sign_out().await;
        assert_eq!(store.auth_state(), AuthState::Anonymous);
        assert_eq!(storage.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_generation_changes_with_session() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        store.restore().await;
        let g0 = store.generation();

        store.sign_in(sample()).await;
        let g1 = store.generation();
        assert!(g1 > g0);

        store.sign_out().await;
        assert!(store.generation() > g1);
    }

    #[tokio::test]
    async fn test_restored_waits_for_restore() {
        let store = SessionStore::new(Arc::new(MemoryStorage::with_session(sample())));
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.restored().await })
        };
        store.restore().await;

        let snapshot = waiter.await.unwrap();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.session, Some(sample()));
    }

    #[tokio::test]
    async fn test_sign_out_if_current_keeps_newer_session() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.restore().await;
        store.sign_in(sample()).await;
        let seen = store.generation();

        let newer = Session::new(json!({"access_token": "xyz", "user_id": "1"}));
        store.sign_in(newer.clone()).await;

        assert!(!store.sign_out_if_current(seen).await);
        assert_eq!(store.session(), Some(newer.clone()));
        assert_eq!(storage.load().await.unwrap(), Some(newer));

        assert!(store.sign_out_if_current(store.generation()).await);
        assert_eq!(store.auth_state(), AuthState::Anonymous);
        assert_eq!(storage.load().await.unwrap(), None);
    }
}
