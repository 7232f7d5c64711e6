//! The gateway's HTTP server, grounded in `aapi-gateway/src/server.rs`'s
//! `GatewayServer`/`GatewayServerBuilder` pair.

use std::sync::Arc;

use axum::middleware;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::middleware::{compression_layer, cors_layer, logging, request_id};
use crate::routes::create_router;
use crate::state::{AppState, GatewayConfig};

pub struct GatewayServer {
    state: Arc<AppState>,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// The core holds no on-disk state (§6), so there is no separate
    /// durable-backend constructor to distinguish from — this exists for
    /// parity with the teacher's `in_memory` test constructor.
    pub fn in_memory(config: GatewayConfig) -> Self {
        Self::new(config)
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn router(&self) -> axum::Router {
        create_router(Arc::clone(&self.state))
            .layer(middleware::from_fn(logging))
            .layer(middleware::from_fn(request_id))
            .layer(compression_layer())
            .layer(cors_layer())
    }

    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.state.config.bind_address();
        let router = self.router();

        info!(address = %addr, "starting authzcore gateway");

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await.map_err(|e| {
            error!(error = %e, "server error");
            Box::new(e) as Box<dyn std::error::Error>
        })
    }

    pub async fn run_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.state.config.bind_address();
        let router = self.router();

        info!(address = %addr, "starting authzcore gateway with graceful shutdown");

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| {
                error!(error = %e, "server error");
                Box::new(e) as Box<dyn std::error::Error>
            })
    }
}

pub struct GatewayServerBuilder {
    config: GatewayConfig,
}

impl Default for GatewayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayServerBuilder {
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn gateway_id(mut self, id: impl Into<String>) -> Self {
        self.config.gateway_id = id.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn build(self) -> GatewayServer {
        GatewayServer::new(self.config)
    }

    pub fn build_in_memory(self) -> GatewayServer {
        GatewayServer::in_memory(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_host_and_port() {
        let server = GatewayServerBuilder::new().host("127.0.0.1").port(8081).build();
        assert_eq!(server.state.config.port, 8081);
        assert_eq!(server.state.config.host, "127.0.0.1");
    }

    #[test]
    fn router_builds_without_panicking() {
        let server = GatewayServerBuilder::new().build();
        let _router = server.router();
    }
}
