use orderdesk_core::session::{Session, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// In-memory store of per-user sessions.
///
/// Each session sits behind its own mutex, so actions of one user are
/// processed one at a time while different users never contend. Sessions
/// live until evicted or the process exits.
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Gets the session of `user_id`, creating a blank one on first contact.
    pub async fn session(&self, user_id: UserId) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&user_id) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| {
                tracing::debug!(user_id, "new session");
                Arc::new(Mutex::new(Session::new(user_id)))
            })
            .clone()
    }

    /// Drops the session of `user_id`; the next contact starts from scratch.
    pub async fn evict(&self, user_id: UserId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&user_id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
