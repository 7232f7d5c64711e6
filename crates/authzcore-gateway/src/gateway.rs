//! The multi-tenant dispatcher: tenant registry, tool allowlist, rate
//! limiting, capability fast-path authorization, and audit emission.
//!
//! Grounded in `14_gateway.py`'s `Gateway` (`register_tenant`, `start`,
//! `authorize`, `get_health`, `get_tenant_stats`) and in the teacher's
//! `aapi-gateway/src/state.rs` for the shape of a config/registry-holding
//! application object.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use authzcore_audit::{AuditAggregator, AuditFilter, AuditStats};
use authzcore_capability::{
    denial, CapabilityManager, RateLimitConfig, SessionRateLimiter, DEFAULT_MAX_SESSIONS,
};
use authzcore_core::SessionId;

/// Lifecycle state of a [`Gateway`]. `authorize()` while `Stopped` short-circuits
/// to `UNAVAILABLE` without touching any tenant state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    Stopped,
    Running,
}

impl GatewayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Stopped => "stopped",
            GatewayStatus::Running => "running",
        }
    }
}

/// Registration-time configuration for one tenant. `allowed_tools` holds
/// exact tool names or the wildcard `"*"`; an empty list leaves every tool
/// unrestricted (no allowlist configured).
pub struct TenantConfig {
    pub tenant_id: String,
    pub capability_manager: CapabilityManager,
    pub rate_limit_config: RateLimitConfig,
    pub allowed_tools: Vec<String>,
}

struct Tenant {
    capability_manager: CapabilityManager,
    rate_limiter: SessionRateLimiter,
    allowed_tools: Vec<String>,
    requests_processed: AtomicU64,
}

fn tool_allowed(allowed_tools: &[String], tool: &str) -> bool {
    if allowed_tools.is_empty() {
        return true;
    }
    allowed_tools
        .iter()
        .any(|pattern| pattern == "*" || pattern == tool)
}

/// An inbound authorization request, constructed by a caller that already
/// authenticated the principal and knows its `tenant_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub request_id: String,
    pub tenant_id: String,
    pub session_id: Option<SessionId>,
    pub tool: String,
    pub method: String,
    /// Tool-call arguments, carried through for the audit trail and for a
    /// future constraint-evaluation step (§9 Open Questions); the dispatch
    /// pipeline itself never inspects them.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayHealth {
    pub status: String,
    pub tenants: usize,
    pub requests_processed: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TenantStats {
    pub tenant_id: String,
    pub allowed_tools: Vec<String>,
    pub requests_processed: u64,
    pub rate_limiter_active_sessions: usize,
}

/// The outcome of one step of the dispatch pipeline, before it is folded
/// into a [`GatewayResponse`] and an audit event.
struct Decision {
    allowed: bool,
    denial_reason: Option<&'static str>,
    capability_id: Option<String>,
}

impl Decision {
    fn deny(reason: &'static str) -> Self {
        Self {
            allowed: false,
            denial_reason: Some(reason),
            capability_id: None,
        }
    }
}

/// The multi-tenant dispatcher. Owns the tenant registry and the audit
/// aggregator exclusively (§3 Ownership); each tenant's `CapabilityManager`
/// and capability universe is disjoint from every other tenant's.
pub struct Gateway {
    status: RwLock<GatewayStatus>,
    tenants: RwLock<HashMap<String, Tenant>>,
    audit: AuditAggregator,
    requests_processed: AtomicU64,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(GatewayStatus::Stopped),
            tenants: RwLock::new(HashMap::new()),
            audit: AuditAggregator::in_memory(),
            requests_processed: AtomicU64::new(0),
        }
    }

    pub fn with_audit(audit: AuditAggregator) -> Self {
        Self {
            status: RwLock::new(GatewayStatus::Stopped),
            tenants: RwLock::new(HashMap::new()),
            audit,
            requests_processed: AtomicU64::new(0),
        }
    }

    pub fn status(&self) -> GatewayStatus {
        *self.status.read().expect("gateway status lock poisoned")
    }

    pub fn start(&self) {
        *self.status.write().expect("gateway status lock poisoned") = GatewayStatus::Running;
    }

    pub fn stop(&self) {
        *self.status.write().expect("gateway status lock poisoned") = GatewayStatus::Stopped;
    }

    /// Idempotent; re-registration replaces the tenant's config atomically.
    pub fn register_tenant(&self, config: TenantConfig) {
        let tenant = Tenant {
            capability_manager: config.capability_manager,
            rate_limiter: SessionRateLimiter::new(config.rate_limit_config, DEFAULT_MAX_SESSIONS),
            allowed_tools: config.allowed_tools,
            requests_processed: AtomicU64::new(0),
        };
        self.tenants
            .write()
            .expect("tenant registry lock poisoned")
            .insert(config.tenant_id, tenant);
    }

    pub fn remove_tenant(&self, tenant_id: &str) {
        self.tenants
            .write()
            .expect("tenant registry lock poisoned")
            .remove(tenant_id);
    }

    pub fn has_tenant(&self, tenant_id: &str) -> bool {
        self.tenants.read().expect("tenant registry lock poisoned").contains_key(tenant_id)
    }

    /// Runs a closure against a tenant's `CapabilityManager` under the
    /// registry's read lock. Used by callers (HTTP handlers, CLI) that need
    /// to `grant`/`delegate`/`revoke` against a specific tenant's manager.
    pub fn with_capability_manager<R>(
        &self,
        tenant_id: &str,
        f: impl FnOnce(&CapabilityManager) -> R,
    ) -> Option<R> {
        let tenants = self.tenants.read().expect("tenant registry lock poisoned");
        tenants.get(tenant_id).map(|t| f(&t.capability_manager))
    }

    /// The five-step dispatch pipeline of §4.7, first failure terminates.
    pub fn authorize(&self, request: GatewayRequest) -> GatewayResponse {
        let start = Instant::now();

        if self.status() != GatewayStatus::Running {
            return self.finish(&request, Decision::deny("UNAVAILABLE"), start);
        }

        let tenants = self.tenants.read().expect("tenant registry lock poisoned");
        let tenant = match tenants.get(&request.tenant_id) {
            Some(tenant) => tenant,
            None => {
                let decision = Decision::deny(denial::UNKNOWN_TENANT);
                drop(tenants);
                return self.finish(&request, decision, start);
            }
        };

        if !tool_allowed(&tenant.allowed_tools, &request.tool) {
            let decision = Decision::deny(denial::TOOL_NOT_ALLOWED);
            drop(tenants);
            return self.finish(&request, decision, start);
        }

        let rate_key = request
            .session_id
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| request.tenant_id.clone());
        if !tenant.rate_limiter.allow(&rate_key) {
            let decision = Decision::deny(denial::RATE_LIMITED);
            drop(tenants);
            return self.finish(&request, decision, start);
        }

        let decision = match &request.session_id {
            Some(session_id) => {
                let result = tenant
                    .capability_manager
                    .authorize_fast(session_id, &request.tool, &request.method);
                Decision {
                    allowed: result.allowed,
                    denial_reason: result.denial_reason,
                    capability_id: result.capability_id.map(|id| id.to_string()),
                }
            }
            None => Decision::deny(denial::SESSION_UNKNOWN),
        };
        tenant.requests_processed.fetch_add(1, Ordering::Relaxed);
        drop(tenants);

        self.finish(&request, decision, start)
    }

    fn finish(&self, request: &GatewayRequest, decision: Decision, start: Instant) -> GatewayResponse {
        let latency_us = start.elapsed().as_micros() as u64;
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
        self.audit.record_authorization(
            Some(request.tenant_id.clone()),
            request
                .session_id
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            Some(request.tool.clone()),
            Some(request.method.clone()),
            decision.capability_id.clone(),
            decision.allowed,
            decision.denial_reason.map(|reason| reason.to_string()),
            Some(latency_us),
        );
        GatewayResponse {
            allowed: decision.allowed,
            error: decision.denial_reason.map(|reason| reason.to_string()),
            latency_us,
            capability_id: decision.capability_id,
        }
    }

    pub fn get_health(&self) -> GatewayHealth {
        GatewayHealth {
            status: self.status().as_str().to_string(),
            tenants: self.tenants.read().expect("tenant registry lock poisoned").len(),
            requests_processed: self.requests_processed.load(Ordering::Relaxed),
        }
    }

    pub fn get_tenant_stats(&self, tenant_id: &str) -> Option<TenantStats> {
        let tenants = self.tenants.read().expect("tenant registry lock poisoned");
        tenants.get(tenant_id).map(|tenant| TenantStats {
            tenant_id: tenant_id.to_string(),
            allowed_tools: tenant.allowed_tools.clone(),
            requests_processed: tenant.requests_processed.load(Ordering::Relaxed),
            rate_limiter_active_sessions: tenant.rate_limiter.get_stats().active_sessions,
        })
    }

    pub fn query_audit(&self, filter: &AuditFilter, limit: usize) -> Vec<authzcore_audit::AuditEvent> {
        self.audit.query(filter, limit)
    }

    pub fn audit_stats(&self) -> AuditStats {
        self.audit.get_stats()
    }

    pub fn audit(&self) -> &AuditAggregator {
        &self.audit
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered_gateway(allowed_tools: Vec<String>) -> Gateway {
        let gateway = Gateway::new();
        gateway.start();
        let config = TenantConfig {
            tenant_id: "tenant-a".to_string(),
            capability_manager: CapabilityManager::new("issuer-1"),
            rate_limit_config: RateLimitConfig::default(),
            allowed_tools,
        };
        gateway.register_tenant(config);
        gateway
    }

    #[test]
    fn unknown_tenant_is_denied() {
        let gateway = Gateway::new();
        gateway.start();
        let response = gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "ghost".to_string(),
            session_id: None,
            tool: "fs".to_string(),
            method: "read".to_string(),
            arguments: serde_json::Value::Null,
        });
        assert!(!response.allowed);
        assert_eq!(response.error.as_deref(), Some(denial::UNKNOWN_TENANT));
    }

    #[test]
    fn stopped_gateway_returns_unavailable() {
        let gateway = Gateway::new();
        let response = gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            session_id: None,
            tool: "fs".to_string(),
            method: "read".to_string(),
            arguments: serde_json::Value::Null,
        });
        assert_eq!(response.error.as_deref(), Some("UNAVAILABLE"));
    }

    #[test]
    fn disallowed_tool_is_denied_before_rate_limit() {
        let gateway = registered_gateway(vec!["fs".to_string()]);
        let response = gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            session_id: None,
            tool: "admin".to_string(),
            method: "delete".to_string(),
            arguments: serde_json::Value::Null,
        });
        assert!(!response.allowed);
        assert_eq!(response.error.as_deref(), Some(denial::TOOL_NOT_ALLOWED));
    }

    #[test]
    fn session_fast_path_end_to_end() {
        let gateway = Gateway::new();
        gateway.start();
        let manager = CapabilityManager::new("issuer-1");
        let cap = manager
            .grant("subject-1", "tool:fs/method:read", Default::default(), 3600, true)
            .unwrap();
        let session_id = SessionId::new();
        manager.cache_session(session_id, &cap);

        gateway.register_tenant(TenantConfig {
            tenant_id: "tenant-a".to_string(),
            capability_manager: manager,
            rate_limit_config: RateLimitConfig::default(),
            allowed_tools: vec![],
        });

        let response = gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            session_id: Some(session_id),
            tool: "fs".to_string(),
            method: "read".to_string(),
            arguments: serde_json::Value::Null,
        });
        assert!(response.allowed);
        assert_eq!(response.capability_id, Some(cap.id.to_string()));
    }

    #[test]
    fn missing_session_id_is_denied_session_unknown() {
        let gateway = registered_gateway(vec![]);
        let response = gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            session_id: None,
            tool: "fs".to_string(),
            method: "read".to_string(),
            arguments: serde_json::Value::Null,
        });
        assert!(!response.allowed);
        assert_eq!(response.error.as_deref(), Some(denial::SESSION_UNKNOWN));
    }

    #[test]
    fn health_reports_tenant_count_and_request_total() {
        let gateway = registered_gateway(vec![]);
        gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            session_id: None,
            tool: "fs".to_string(),
            method: "read".to_string(),
            arguments: serde_json::Value::Null,
        });
        let health = gateway.get_health();
        assert_eq!(health.status, "running");
        assert_eq!(health.tenants, 1);
        assert_eq!(health.requests_processed, 1);
    }

    #[test]
    fn tenant_stats_report_allowed_tools_and_request_count() {
        let gateway = registered_gateway(vec!["fs".to_string()]);
        gateway.authorize(GatewayRequest {
            request_id: "req-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            session_id: None,
            tool: "fs".to_string(),
            method: "read".to_string(),
            arguments: serde_json::Value::Null,
        });
        let stats = gateway.get_tenant_stats("tenant-a").unwrap();
        assert_eq!(stats.allowed_tools, vec!["fs".to_string()]);
        assert_eq!(stats.requests_processed, 1);
    }
}
