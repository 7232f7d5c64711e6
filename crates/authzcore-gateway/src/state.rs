//! Gateway application configuration and shared state, grounded in the
//! teacher's `aapi-gateway/src/state.rs` (`GatewayConfig`/`AppState` shape),
//! generalized from a single-process gateway config to one that also
//! carries per-tenant rate-limit defaults (`14_gateway.py`'s
//! `RateLimitConfig`).

use std::sync::Arc;

use authzcore_capability::RateLimitConfig;

/// Top-level gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub gateway_id: String,
    /// Default rate-limit policy applied to a tenant registered without an
    /// explicit override.
    pub default_rate_limit: RateLimitConfig,
    pub request_timeout_secs: u64,
    pub max_body_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            gateway_id: uuid::Uuid::new_v4().to_string(),
            default_rate_limit: RateLimitConfig::default(),
            request_timeout_secs: 30,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

impl GatewayConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loads overrides from environment variables prefixed `AUTHZCORE_`
    /// (e.g. `AUTHZCORE_PORT`, `AUTHZCORE_HOST`), falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("AUTHZCORE_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("AUTHZCORE_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(gateway_id) = std::env::var("AUTHZCORE_GATEWAY_ID") {
            config.gateway_id = gateway_id;
        }
        config
    }
}

/// Shared application state handed to every axum handler.
pub struct AppState {
    pub config: GatewayConfig,
    pub gateway: Arc<crate::gateway::Gateway>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        let gateway = Arc::new(crate::gateway::Gateway::new());
        gateway.start();
        Self { config, gateway }
    }
}
