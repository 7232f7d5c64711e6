//! Authzcore Gateway - the multi-tenant dispatcher: tenant registry, tool
//! allowlist, rate limiting, capability fast-path authorization, and audit
//! emission, plus the HTTP surface around it.

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{Gateway, GatewayHealth, GatewayRequest, GatewayResponse, GatewayStatus, TenantConfig, TenantStats};
pub use server::{GatewayServer, GatewayServerBuilder};
pub use state::{AppState, GatewayConfig};
