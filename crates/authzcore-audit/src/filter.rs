//! `query(filter, limit)` selects on any subset of `{event_type, agent_id,
//! tenant_id, tool, time_range}`; every unset field matches everything.

use crate::event::{AuditEvent, AuditEventType};

#[derive(Clone, Debug, Default)]
pub struct AuditFilter {
    pub event_type: Option<AuditEventType>,
    pub agent_id: Option<String>,
    pub tenant_id: Option<String>,
    pub tool: Option<String>,
    /// Inclusive `[start, end]` range over `AuditEvent::timestamp`, in
    /// seconds since the Unix epoch.
    pub time_range: Option<(f64, f64)>,
}

impl AuditFilter {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(event_type) = self.event_type {
            if event.event_type != event_type {
                return false;
            }
        }
        if let Some(agent_id) = &self.agent_id {
            if &event.agent_id != agent_id {
                return false;
            }
        }
        if let Some(tenant_id) = &self.tenant_id {
            if event.tenant_id.as_deref() != Some(tenant_id.as_str()) {
                return false;
            }
        }
        if let Some(tool) = &self.tool {
            if event.tool.as_deref() != Some(tool.as_str()) {
                return false;
            }
        }
        if let Some((start, end)) = self.time_range {
            if event.timestamp < start || event.timestamp > end {
                return false;
            }
        }
        true
    }
}
