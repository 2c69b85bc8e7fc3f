//! Live queue position tracking.
//!
//! Positions are written only by the coordinator task (single-writer
//! discipline) but may be read lock-free from anywhere -- the HTTP surface
//! answers position queries straight off this map without a round trip
//! through the coordinator.

use std::sync::Arc;

use dashmap::DashMap;

use scrivener_types::session::ClientId;

/// Shared view of every waiting client's 1-based queue position.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct PositionBoard {
    inner: Arc<DashMap<ClientId, usize>>,
}

impl PositionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly admitted client's position.
    pub fn insert(&self, client_id: ClientId, position: usize) {
        self.inner.insert(client_id, position);
    }

    pub fn get(&self, client_id: &ClientId) -> Option<usize> {
        self.inner.get(client_id).map(|entry| *entry)
    }

    /// Drop a client's entry. Idempotent.
    pub fn remove(&self, client_id: &ClientId) {
        self.inner.remove(client_id);
    }

    /// A job left the front of the queue for a concurrency slot: clear its
    /// entry and move every still-waiting client up by exactly one.
    pub fn job_started(&self, client_id: &ClientId) {
        self.inner.remove(client_id);
        for mut entry in self.inner.iter_mut() {
            let moved_up = entry.saturating_sub(1);
            *entry = moved_up;
        }
    }

    /// A waiting job at `position` was evicted: clients behind it move up
    /// by one, clients ahead of it are unaffected.
    pub fn evicted(&self, position: usize) {
        for mut entry in self.inner.iter_mut() {
            if *entry > position {
                *entry -= 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
