//! Process-wide session store

use super::store::{ChatMessage, Session};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// A shared, lockable session.
///
/// Holding the lock across a whole turn keeps concurrent posts to the
/// same session from interleaving their appends.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory mapping from session id to its transcript.
///
/// Entries live for the lifetime of the process; nothing is persisted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh, empty session and return its id
    pub fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(Session::new(&id))));
        debug!(session_id = %id, "Created session");
        id
    }

    /// Return the session for `id`, creating an empty one if it is unknown
    pub fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().get(id) {
            return Arc::clone(handle);
        }

        let mut sessions = self.sessions.write();
        let handle = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session_id = %id, "Initializing unknown session");
            Arc::new(Mutex::new(Session::new(id)))
        });
        Arc::clone(handle)
    }

    /// Look up a session without creating it
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().get(id).cloned()
    }

    /// Append `message` to an existing session.
    ///
    /// Unknown ids are rejected; sessions are only created through
    /// [`create_session`](Self::create_session) or
    /// [`get_or_create`](Self::get_or_create).
    ///
    /// This takes the session lock for the single push. A conversation turn
    /// already holds the lock from [`get_or_create`](Self::get_or_create)
    /// and appends through that guard with [`Session::push`] instead, since
    /// calling this while holding it would wait forever.
    pub async fn append(&self, id: &str, message: ChatMessage) -> crate::Result<()> {
        let handle = self
            .get(id)
            .ok_or_else(|| crate::Error::Session(format!("unknown session: {}", id)))?;
        handle.lock().await.push(message);
        Ok(())
    }

    /// The full ordered transcript, or empty if the session is unknown
    pub async fn list(&self, id: &str) -> Vec<ChatMessage> {
        match self.get(id) {
            Some(handle) => handle.lock().await.messages.clone(),
            None => Vec::new(),
        }
    }

    /// Whether a session with this id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Number of registered sessions, orphaned ones included
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_session_registers_empty_sequence() {
        let store = SessionStore::new();
        let id = store.create_session();

        assert!(store.contains(&id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_session_ids_are_distinct() {
        let store = SessionStore::new();
        assert_ne!(store.create_session(), store.create_session());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = SessionStore::new();
        let first = store.get_or_create("stale-id");
        first.lock().await.push(ChatMessage::user("hello"));

        let second = store.get_or_create("stale-id");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_append_requires_existing_session() {
        let store = SessionStore::new();
        let err = store
            .append("missing", ChatMessage::user("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, crate::Error::Session(_)));
        assert!(!store.contains("missing"));
    }

    #[tokio::test]
    async fn test_append_and_list_preserve_order() {
        let store = SessionStore::new();
        let id = store.create_session();

        store.append(&id, ChatMessage::user("one")).await.unwrap();
        store.append(&id, ChatMessage::assistant("two")).await.unwrap();

        let messages = store.list(&id).await;
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_list_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.list("nope").await.is_empty());
        assert!(store.is_empty());
    }
}
