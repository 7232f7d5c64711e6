//! The abstract `AuditStore` capability set (`append`, `query`, `snapshot`)
//! and the in-memory reference implementation.
//!
//! The source models durable stores via runtime polymorphism; we express
//! the same seam as a trait object (`Arc<dyn AuditStore>`) so a future
//! durable store (out of scope for this core) can be dropped in without
//! touching the aggregator.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::AuditResult;
use crate::event::AuditEvent;
use crate::filter::AuditFilter;

pub const DEFAULT_RING_SIZE: usize = 10_000;

/// A write-dominant append-only event stream. Implementations MUST assign
/// `event_id` under the same synchronization that performs the insertion,
/// so `event_id` is strictly monotonic and equal to insertion order (G2).
pub trait AuditStore: Send + Sync {
    /// Assigns the next `event_id` to `event` and appends it. Returns the
    /// assigned id.
    fn append(&self, event: AuditEvent) -> AuditResult<u64>;

    /// Newest-first, bounded by `limit`.
    fn query(&self, filter: &AuditFilter, limit: usize) -> Vec<AuditEvent>;

    /// A complete, consistent snapshot of every retained event, oldest-first.
    fn snapshot(&self) -> Vec<AuditEvent>;
}

struct Ring {
    events: VecDeque<AuditEvent>,
    next_id: u64,
}

/// Holds up to `max_events` in a ring buffer; the oldest event is dropped on
/// overflow. Writes serialize through a single mutex (§5: "the audit store
/// serializes writes"); readers see a consistent snapshot under the same
/// lock.
pub struct InMemoryAuditStore {
    max_events: usize,
    ring: Mutex<Ring>,
}

impl InMemoryAuditStore {
    pub fn new(max_events: usize) -> Self {
        Self {
            max_events: max_events.max(1),
            ring: Mutex::new(Ring {
                events: VecDeque::new(),
                next_id: 1,
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RING_SIZE)
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, mut event: AuditEvent) -> AuditResult<u64> {
        let mut ring = self.ring.lock().expect("audit ring mutex poisoned");
        let id = ring.next_id;
        ring.next_id += 1;
        event.event_id = id;

        if ring.events.len() >= self.max_events {
            ring.events.pop_front();
        }
        ring.events.push_back(event);
        Ok(id)
    }

    fn query(&self, filter: &AuditFilter, limit: usize) -> Vec<AuditEvent> {
        let ring = self.ring.lock().expect("audit ring mutex poisoned");
        ring.events
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(limit)
            .cloned()
            .collect()
    }

    fn snapshot(&self) -> Vec<AuditEvent> {
        let ring = self.ring.lock().expect("audit ring mutex poisoned");
        ring.events.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AuditEventType;

    fn sample(event_type: AuditEventType, agent_id: &str) -> AuditEvent {
        AuditEvent {
            event_id: 0,
            timestamp: 1_700_000_000.0,
            event_type,
            tenant_id: None,
            agent_id: agent_id.to_string(),
            tool: None,
            method: None,
            capability_id: None,
            allowed: None,
            denial_reason: None,
            latency_us: None,
        }
    }

    #[test]
    fn event_ids_are_monotonic_and_equal_insertion_order() {
        let store = InMemoryAuditStore::with_defaults();
        let first = store.append(sample(AuditEventType::Approval, "a")).unwrap();
        let second = store.append(sample(AuditEventType::Denial, "b")).unwrap();
        assert!(first < second);
    }

    #[test]
    fn overflow_drops_oldest() {
        let store = InMemoryAuditStore::new(2);
        store.append(sample(AuditEventType::Approval, "a")).unwrap();
        store.append(sample(AuditEventType::Approval, "b")).unwrap();
        store.append(sample(AuditEventType::Approval, "c")).unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].agent_id, "b");
        assert_eq!(snapshot[1].agent_id, "c");
    }

    #[test]
    fn query_is_newest_first_and_bounded() {
        let store = InMemoryAuditStore::with_defaults();
        for i in 0..5 {
            store.append(sample(AuditEventType::Approval, &format!("agent{i}"))).unwrap();
        }
        let results = store.query(&AuditFilter::default(), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].agent_id, "agent4");
        assert_eq!(results[1].agent_id, "agent3");
    }

    #[test]
    fn query_filters_by_event_type() {
        let store = InMemoryAuditStore::with_defaults();
        store.append(sample(AuditEventType::Approval, "a")).unwrap();
        store.append(sample(AuditEventType::Denial, "b")).unwrap();
        let filter = AuditFilter {
            event_type: Some(AuditEventType::Denial),
            ..Default::default()
        };
        let results = store.query(&filter, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].agent_id, "b");
    }
}
