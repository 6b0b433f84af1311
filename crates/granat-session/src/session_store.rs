//! Session persistence seam.
//!
//! The router only talks to [`SessionStore`]. The in-memory implementation
//! keeps one entry per chat for the process lifetime; there is no eviction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::session_state::Session;

/// Chat identifier as delivered by the transport.
pub type ChatId = i64;

/// Maps a chat to its conversation state.
pub trait SessionStore: Send + Sync {
    /// Current state, `Idle` when the chat was never seen.
    fn get(&self, chat_id: ChatId) -> Session;

    fn set(&self, chat_id: ChatId, session: Session);

    /// Resets the chat to `Idle`.
    fn clear(&self, chat_id: ChatId) {
        self.set(chat_id, Session::Idle);
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<ChatId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats with a stored entry.
    pub fn len(&self) -> usize {
        lock_or_recover(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, chat_id: ChatId) -> Session {
        lock_or_recover(&self.sessions)
            .get(&chat_id)
            .copied()
            .unwrap_or_default()
    }

    fn set(&self, chat_id: ChatId, session: Session) {
        lock_or_recover(&self.sessions).insert(chat_id, session);
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
