//! HTTP handlers, grounded in `aapi-gateway/src/handlers.rs`'s extractor and
//! `GatewayResult<Json<T>>` return-type conventions.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use authzcore_audit::{AuditEvent, AuditEventType, AuditFilter, AuditStats};
use authzcore_capability::{Capability, RateLimitConfig};
use authzcore_core::SessionId;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{GatewayHealth, GatewayRequest, GatewayResponse, TenantConfig, TenantStats};
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<GatewayHealth> {
    Json(state.gateway.get_health())
}

#[derive(Debug, Serialize)]
pub struct GatewayMetrics {
    pub health: GatewayHealth,
    pub audit: AuditStats,
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<GatewayMetrics> {
    Json(GatewayMetrics {
        health: state.gateway.get_health(),
        audit: state.gateway.audit_stats(),
    })
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequestBody {
    pub request_id: String,
    pub tenant_id: String,
    pub session_id: Option<SessionId>,
    pub tool: String,
    pub method: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

pub async fn authorize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AuthorizeRequestBody>,
) -> Json<GatewayResponse> {
    let response = state.gateway.authorize(GatewayRequest {
        request_id: body.request_id,
        tenant_id: body.tenant_id,
        session_id: body.session_id,
        tool: body.tool,
        method: body.method,
        arguments: body.arguments,
    });
    Json(response)
}

#[derive(Debug, Deserialize)]
pub struct RegisterTenantBody {
    pub tenant_id: String,
    pub issuer_id: String,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Serialize)]
pub struct RegisterTenantResponse {
    pub tenant_id: String,
    pub issuer_public_key: String,
}

pub async fn register_tenant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterTenantBody>,
) -> GatewayResult<Json<RegisterTenantResponse>> {
    if body.tenant_id.trim().is_empty() {
        return Err(GatewayError::Validation("tenant_id must not be empty".to_string()));
    }
    let manager = authzcore_capability::CapabilityManager::new(body.issuer_id.clone());
    let issuer_public_key = manager.public_key().to_hex();
    state.gateway.register_tenant(TenantConfig {
        tenant_id: body.tenant_id.clone(),
        capability_manager: manager,
        rate_limit_config: body.rate_limit.unwrap_or_else(|| state.config.default_rate_limit.clone()),
        allowed_tools: body.allowed_tools,
    });
    Ok(Json(RegisterTenantResponse {
        tenant_id: body.tenant_id,
        issuer_public_key,
    }))
}

pub async fn remove_tenant(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> GatewayResult<Json<serde_json::Value>> {
    if !state.gateway.has_tenant(&tenant_id) {
        return Err(GatewayError::UnknownTenant(tenant_id));
    }
    state.gateway.remove_tenant(&tenant_id);
    Ok(Json(serde_json::json!({ "removed": true })))
}

pub async fn tenant_stats(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
) -> GatewayResult<Json<TenantStats>> {
    state
        .gateway
        .get_tenant_stats(&tenant_id)
        .map(Json)
        .ok_or_else(|| GatewayError::UnknownTenant(tenant_id))
}

#[derive(Debug, Deserialize)]
pub struct GrantCapabilityBody {
    pub subject: String,
    pub scope: String,
    #[serde(default)]
    pub constraints: BTreeMap<String, serde_json::Value>,
    pub expires_in: i64,
    #[serde(default)]
    pub delegatable: bool,
}

pub async fn grant_capability(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Json(body): Json<GrantCapabilityBody>,
) -> GatewayResult<Json<Capability>> {
    let tenant_id_for_error = tenant_id.clone();
    let result = state.gateway.with_capability_manager(&tenant_id, |manager| {
        manager.grant(body.subject, body.scope, body.constraints, body.expires_in, body.delegatable)
    });
    match result {
        None => Err(GatewayError::UnknownTenant(tenant_id_for_error)),
        Some(Ok(cap)) => Ok(Json(cap)),
        Some(Err(err)) => Err(GatewayError::Validation(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct DelegateCapabilityBody {
    pub parent: Capability,
    pub new_subject: String,
    pub narrowed_scope: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub delegatable: Option<bool>,
}

pub async fn delegate_capability(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Json(body): Json<DelegateCapabilityBody>,
) -> GatewayResult<Json<Capability>> {
    let tenant_id_for_error = tenant_id.clone();
    let result = state.gateway.with_capability_manager(&tenant_id, |manager| {
        manager.delegate(&body.parent, body.new_subject, body.narrowed_scope, body.expires_in, body.delegatable)
    });
    match result {
        None => Err(GatewayError::UnknownTenant(tenant_id_for_error)),
        Some(Ok(cap)) => Ok(Json(cap)),
        Some(Err(err)) => Err(GatewayError::Validation(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct RevokeCapabilityBody {
    pub capability_id: authzcore_core::CapabilityId,
}

pub async fn revoke_capability(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Json(body): Json<RevokeCapabilityBody>,
) -> GatewayResult<Json<serde_json::Value>> {
    let tenant_id_for_error = tenant_id.clone();
    let result = state.gateway.with_capability_manager(&tenant_id, |manager| {
        manager.revoke(body.capability_id);
    });
    match result {
        None => Err(GatewayError::UnknownTenant(tenant_id_for_error)),
        Some(()) => Ok(Json(serde_json::json!({ "revoked": true }))),
    }
}

#[derive(Debug, Deserialize)]
pub struct CacheSessionBody {
    pub session_id: SessionId,
    pub capability: Capability,
}

pub async fn cache_session(
    State(state): State<Arc<AppState>>,
    Path(tenant_id): Path<String>,
    Json(body): Json<CacheSessionBody>,
) -> GatewayResult<Json<serde_json::Value>> {
    let tenant_id_for_error = tenant_id.clone();
    let result = state.gateway.with_capability_manager(&tenant_id, |manager| {
        manager.cache_session(body.session_id, &body.capability);
    });
    match result {
        None => Err(GatewayError::UnknownTenant(tenant_id_for_error)),
        Some(()) => Ok(Json(serde_json::json!({ "cached": true }))),
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub event_type: Option<String>,
    pub agent_id: Option<String>,
    pub tenant_id: Option<String>,
    pub tool: Option<String>,
    pub limit: Option<usize>,
}

pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditQuery>,
) -> GatewayResult<Json<Vec<AuditEvent>>> {
    let event_type = match query.event_type.as_deref() {
        None => None,
        Some("approval") => Some(AuditEventType::Approval),
        Some("denial") => Some(AuditEventType::Denial),
        Some("revocation") => Some(AuditEventType::Revocation),
        Some(other) => return Err(GatewayError::Validation(format!("unknown event_type: {other}"))),
    };
    let filter = AuditFilter {
        event_type,
        agent_id: query.agent_id,
        tenant_id: query.tenant_id,
        tool: query.tool,
        time_range: None,
    };
    let limit = query.limit.unwrap_or(authzcore_audit::DEFAULT_QUERY_LIMIT);
    Ok(Json(state.gateway.query_audit(&filter, limit)))
}

pub async fn audit_stats(State(state): State<Arc<AppState>>) -> Json<AuditStats> {
    Json(state.gateway.audit_stats())
}

pub async fn export_audit_json(State(state): State<Arc<AppState>>) -> GatewayResult<String> {
    state
        .gateway
        .audit()
        .export_json()
        .map_err(|err| GatewayError::Internal(err.to_string()))
}

pub async fn export_audit_csv(State(state): State<Arc<AppState>>) -> String {
    state.gateway.audit().export_csv()
}
