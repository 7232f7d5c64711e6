//! Pre-validated `(session_id -> capability_id, expires_at)` bindings. The
//! hottest shared structure in the system: reads must not contend, so this
//! is a read-write lock over a plain map rather than anything fancier —
//! `std::sync::RwLock` readers never block each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use authzcore_core::{CapabilityId, SessionId};

pub const DEFAULT_SESSION_CACHE_SIZE: usize = 1_000;

#[derive(Clone, Copy, Debug)]
pub struct SessionEntry {
    pub capability_id: CapabilityId,
    pub expires_at: u64,
    inserted_at: u64,
}

pub struct SessionCache {
    max_size: usize,
    entries: RwLock<HashMap<SessionId, SessionEntry>>,
    clock: AtomicU64,
}

impl SessionCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SESSION_CACHE_SIZE)
    }

    pub fn insert(&self, session_id: SessionId, capability_id: CapabilityId, expires_at: u64) {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let mut entries = self.entries.write().expect("session cache lock poisoned");

        if !entries.contains_key(&session_id) && entries.len() >= self.max_size {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(id, _)| *id)
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            session_id,
            SessionEntry {
                capability_id,
                expires_at,
                inserted_at: tick,
            },
        );
    }

    /// O(1) read. Does not itself check expiry or revocation — the caller
    /// (`CapabilityManager::authorize_fast`) applies those checks so the
    /// cache stays a pure lookup table.
    pub fn get(&self, session_id: &SessionId) -> Option<SessionEntry> {
        self.entries
            .read()
            .expect("session cache lock poisoned")
            .get(session_id)
            .copied()
    }

    pub fn remove(&self, session_id: &SessionId) {
        self.entries
            .write()
            .expect("session cache lock poisoned")
            .remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("session cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_roundtrips() {
        let cache = SessionCache::new(10);
        let session_id = SessionId::new();
        let cap_id = CapabilityId::new();
        cache.insert(session_id, cap_id, 1_000);
        let entry = cache.get(&session_id).unwrap();
        assert_eq!(entry.capability_id, cap_id);
        assert_eq!(entry.expires_at, 1_000);
    }

    #[test]
    fn miss_returns_none() {
        let cache = SessionCache::new(10);
        assert!(cache.get(&SessionId::new()).is_none());
    }

    #[test]
    fn eviction_drops_oldest_entry_over_capacity() {
        let cache = SessionCache::new(2);
        let a = SessionId::new();
        let b = SessionId::new();
        let c = SessionId::new();
        cache.insert(a, CapabilityId::new(), 1);
        cache.insert(b, CapabilityId::new(), 1);
        cache.insert(c, CapabilityId::new(), 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a).is_none());
    }

    #[test]
    fn remove_clears_entry() {
        let cache = SessionCache::new(10);
        let session_id = SessionId::new();
        cache.insert(session_id, CapabilityId::new(), 1);
        cache.remove(&session_id);
        assert!(cache.get(&session_id).is_none());
    }
}
