//! The summary view over an audit stream, grounded in `13_audit_plane.py`'s
//! `get_stats()` (`total_events`, `denial_count`, `approval_rate`, plus
//! breakdowns by tenant and denial reason).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: usize,
    pub denial_count: usize,
    pub approval_count: usize,
    /// `approval_count / (approval_count + denial_count)`, or `0.0` when no
    /// authorization events have been recorded yet.
    pub approval_rate: f64,
    pub by_tenant: HashMap<String, usize>,
    pub by_denial_reason: HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_have_zero_rate() {
        let stats = AuditStats::default();
        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.approval_rate, 0.0);
    }
}
