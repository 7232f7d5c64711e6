//! The audit event taxonomy: an immutable record of one decision or state
//! change, queryable and exportable but never mutated after creation.

use serde::{Deserialize, Serialize};

/// The kind of decision or state change an `AuditEvent` records. Mirrors the
/// reference implementation's `AuditEventType` (`13_audit_plane.py`):
/// authorizations split into `Approval`/`Denial` even though both carry an
/// `allowed` field, so a query can select "every denial" without inspecting
/// the boolean, and revocations get their own tag since they have no
/// `allowed` verdict at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Approval,
    Denial,
    Revocation,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::Approval => "approval",
            AuditEventType::Denial => "denial",
            AuditEventType::Revocation => "revocation",
        }
    }
}

/// An immutable record of one authorization decision or revocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: u64,
    /// Seconds since the Unix epoch, as a float to match the JSON export
    /// contract (`timestamp` is a floating-point number in §6). The CSV
    /// export renders this as `timestamp_iso8601` instead.
    pub timestamp: f64,
    pub event_type: AuditEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_us: Option<u64>,
}
