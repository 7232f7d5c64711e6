//! Router assembly, grounded in `aapi-gateway/src/routes.rs`'s
//! `create_router`/`with_state` pattern.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/v1/authorize", post(handlers::authorize))
        .route("/v1/tenants", post(handlers::register_tenant))
        .route("/v1/tenants/:tenant_id", delete(handlers::remove_tenant))
        .route("/v1/tenants/:tenant_id/stats", get(handlers::tenant_stats))
        .route("/v1/tenants/:tenant_id/capabilities", post(handlers::grant_capability))
        .route("/v1/tenants/:tenant_id/capabilities/delegate", post(handlers::delegate_capability))
        .route("/v1/tenants/:tenant_id/capabilities/revoke", post(handlers::revoke_capability))
        .route("/v1/tenants/:tenant_id/sessions", post(handlers::cache_session))
        .route("/v1/audit", get(handlers::query_audit))
        .route("/v1/audit/stats", get(handlers::audit_stats))
        .route("/v1/audit/export.json", get(handlers::export_audit_json))
        .route("/v1/audit/export.csv", get(handlers::export_audit_csv))
        .with_state(state)
}
