//! Single-writer session store.
//!
//! Owned exclusively by the coordinator task, which is the only writer in
//! the system; running jobs never touch it -- they carry their own
//! immutable snapshot. Because all access happens on one task, a plain
//! `HashMap` suffices and no lock is needed.

use std::collections::HashMap;

use scrivener_types::session::{ClientId, Session};

/// Map from client id to that client's live dialog session.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: HashMap<ClientId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, client_id: &ClientId) -> Option<&Session> {
        self.inner.get(client_id)
    }

    /// Remove and return the session, handing ownership to a state-machine
    /// transition. The transition result decides whether it comes back.
    pub fn take(&mut self, client_id: &ClientId) -> Option<Session> {
        self.inner.remove(client_id)
    }

    /// Insert or replace the session for its client.
    pub fn upsert(&mut self, session: Session) {
        self.inner.insert(session.client_id.clone(), session);
    }

    /// Delete the session, if any. Idempotent.
    pub fn delete(&mut self, client_id: &ClientId) {
        self.inner.remove(client_id);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
