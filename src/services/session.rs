//! In-memory session registry for document-store accounts.

use dashmap::DashMap;
use std::sync::Arc;

/// Maps session tokens to usernames.
///
/// Shared by every clone. Tokens never expire; logging in again adds a new
/// token without revoking older ones.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `username` and return its token.
    pub fn create(&self, username: &str) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .insert(session_id.clone(), username.to_string());
        session_id
    }

    pub fn resolve(&self, session_id: &str) -> Option<String> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    /// Drop a session. Returns the username it belonged to.
    pub fn remove(&self, session_id: &str) -> Option<String> {
        self.sessions.remove(session_id).map(|(_, username)| username)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
