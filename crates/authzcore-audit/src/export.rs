//! Export helpers. Column order is fixed per the wire contract in §6 so
//! downstream consumers can rely on positional parsing:
//! `event_id, timestamp_iso8601, event_type, tenant_id, agent_id, tool,
//! method, capability_id, allowed, denial_reason, latency_us`.

use chrono::DateTime;

use crate::error::{AuditError, AuditResult};
use crate::event::AuditEvent;

pub fn export_json(events: &[AuditEvent]) -> AuditResult<String> {
    serde_json::to_string_pretty(events).map_err(|err| AuditError::ExportFailed(err.to_string()))
}

fn to_iso8601(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    let nanos = ((timestamp.fract()) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(secs, nanos)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

pub fn export_csv(events: &[AuditEvent]) -> String {
    let mut out = String::from(
        "event_id,timestamp_iso8601,event_type,tenant_id,agent_id,tool,method,capability_id,allowed,denial_reason,latency_us\n",
    );
    for event in events {
        let fields = [
            event.event_id.to_string(),
            to_iso8601(event.timestamp),
            event.event_type.as_str().to_string(),
            opt_str(&event.tenant_id),
            event.agent_id.clone(),
            opt_str(&event.tool),
            opt_str(&event.method),
            opt_str(&event.capability_id),
            event.allowed.map(|a| a.to_string()).unwrap_or_default(),
            opt_str(&event.denial_reason),
            event.latency_us.map(|v| v.to_string()).unwrap_or_default(),
        ];
        out.push_str(
            &fields
                .iter()
                .map(|field| csv_quote(field))
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
    }
    out
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// RFC 4180: a field containing a comma, quote, or newline is wrapped in
/// double quotes, with embedded quotes doubled.
fn csv_quote(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
