//! `AuditAggregator` is the audit plane's single entry point: every
//! authorization decision and revocation in the gateway funnels through
//! `record_authorization`/`record_revocation`, and every read (`query`,
//! `get_stats`, the export helpers) goes back out through it. Grounded in
//! `13_audit_plane.py`'s `AuditAggregator`.

use std::sync::Arc;

use tracing::debug;

use crate::event::{AuditEvent, AuditEventType};
use crate::filter::AuditFilter;
use crate::stats::AuditStats;
use crate::store::{AuditStore, InMemoryAuditStore};

pub const DEFAULT_QUERY_LIMIT: usize = 10;

pub struct AuditAggregator {
    store: Arc<dyn AuditStore>,
}

impl AuditAggregator {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAuditStore::with_defaults()))
    }

    /// Records one authorization decision. A write failure here is logged,
    /// never surfaced to the caller as an authorization failure — the
    /// decision already stands.
    #[allow(clippy::too_many_arguments)]
    pub fn record_authorization(
        &self,
        tenant_id: Option<String>,
        agent_id: impl Into<String>,
        tool: Option<String>,
        method: Option<String>,
        capability_id: Option<String>,
        allowed: bool,
        denial_reason: Option<String>,
        latency_us: Option<u64>,
    ) -> u64 {
        let event = AuditEvent {
            event_id: 0,
            timestamp: authzcore_core::unix_timestamp() as f64,
            event_type: if allowed {
                AuditEventType::Approval
            } else {
                AuditEventType::Denial
            },
            tenant_id,
            agent_id: agent_id.into(),
            tool,
            method,
            capability_id,
            allowed: Some(allowed),
            denial_reason,
            latency_us,
        };
        match self.store.append(event) {
            Ok(id) => id,
            Err(err) => {
                debug!(error = %err, "audit append failed");
                0
            }
        }
    }

    pub fn record_revocation(
        &self,
        agent_id: impl Into<String>,
        capability_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> u64 {
        let event = AuditEvent {
            event_id: 0,
            timestamp: authzcore_core::unix_timestamp() as f64,
            event_type: AuditEventType::Revocation,
            tenant_id: None,
            agent_id: agent_id.into(),
            tool: None,
            method: None,
            capability_id: Some(capability_id.into()),
            allowed: None,
            denial_reason: Some(reason.into()),
            latency_us: None,
        };
        match self.store.append(event) {
            Ok(id) => id,
            Err(err) => {
                debug!(error = %err, "audit append failed");
                0
            }
        }
    }

    pub fn query(&self, filter: &AuditFilter, limit: usize) -> Vec<AuditEvent> {
        self.store.query(filter, limit)
    }

    pub fn query_default(&self) -> Vec<AuditEvent> {
        self.query(&AuditFilter::default(), DEFAULT_QUERY_LIMIT)
    }

    pub fn get_stats(&self) -> AuditStats {
        let events = self.store.snapshot();
        let mut stats = AuditStats {
            total_events: events.len(),
            ..Default::default()
        };
        for event in &events {
            match event.event_type {
                AuditEventType::Approval => stats.approval_count += 1,
                AuditEventType::Denial => {
                    stats.denial_count += 1;
                    if let Some(reason) = &event.denial_reason {
                        *stats.by_denial_reason.entry(reason.clone()).or_insert(0) += 1;
                    }
                }
                AuditEventType::Revocation => {}
            }
            if let Some(tenant_id) = &event.tenant_id {
                *stats.by_tenant.entry(tenant_id.clone()).or_insert(0) += 1;
            }
        }
        let decided = stats.approval_count + stats.denial_count;
        stats.approval_rate = if decided == 0 {
            0.0
        } else {
            stats.approval_count as f64 / decided as f64
        };
        stats
    }

    pub fn export_json(&self) -> Result<String, crate::error::AuditError> {
        crate::export::export_json(&self.store.snapshot())
    }

    pub fn export_csv(&self) -> String {
        crate::export::export_csv(&self.store.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_approval_and_denial_distinctly() {
        let aggregator = AuditAggregator::in_memory();
        aggregator.record_authorization(
            Some("tenant-a".to_string()),
            "agent-1",
            Some("fs".to_string()),
            Some("read".to_string()),
            Some("cap-1".to_string()),
            true,
            None,
            Some(120),
        );
        aggregator.record_authorization(
            Some("tenant-a".to_string()),
            "agent-1",
            Some("fs".to_string()),
            Some("write".to_string()),
            None,
            false,
            Some("scope_mismatch".to_string()),
            Some(80),
        );
        let stats = aggregator.get_stats();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.approval_count, 1);
        assert_eq!(stats.denial_count, 1);
        assert_eq!(stats.approval_rate, 0.5);
        assert_eq!(stats.by_tenant.get("tenant-a"), Some(&2));
        assert_eq!(stats.by_denial_reason.get("scope_mismatch"), Some(&1));
    }

    #[test]
    fn revocation_does_not_affect_approval_rate() {
        let aggregator = AuditAggregator::in_memory();
        aggregator.record_authorization(
            None, "agent-1", None, None, Some("cap-1".to_string()), true, None, None,
        );
        aggregator.record_revocation("agent-1", "cap-1", "manual_revoke");
        let stats = aggregator.get_stats();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.approval_rate, 1.0);
    }

    #[test]
    fn query_default_returns_newest_first_limited_to_ten() {
        let aggregator = AuditAggregator::in_memory();
        for i in 0..15 {
            aggregator.record_authorization(
                None,
                format!("agent-{i}"),
                None,
                None,
                None,
                true,
                None,
                None,
            );
        }
        let results = aggregator.query_default();
        assert_eq!(results.len(), DEFAULT_QUERY_LIMIT);
        assert_eq!(results[0].agent_id, "agent-14");
    }

    #[test]
    fn query_by_agent_id() {
        let aggregator = AuditAggregator::in_memory();
        aggregator.record_authorization(None, "agent-a", None, None, None, true, None, None);
        aggregator.record_authorization(None, "agent-b", None, None, None, true, None, None);
        let filter = AuditFilter {
            agent_id: Some("agent-a".to_string()),
            ..Default::default()
        };
        let results = aggregator.query(&filter, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].agent_id, "agent-a");
    }
}
