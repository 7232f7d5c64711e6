//! Ambient HTTP middleware, grounded in `aapi-gateway/src/middleware.rs`.
//! The request-level rate limiter from the teacher is dropped here — this
//! gateway's admission control is the tenant-scoped `SessionRateLimiter`
//! inside `Gateway::authorize`, not a second HTTP-layer limiter (see
//! DESIGN.md).

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, span, Level};
use uuid::Uuid;

/// Adds (or propagates) an `x-request-id` header on both the request and
/// the response.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());

    let mut response = next.run(request).await;

    response
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());

    response
}

/// Emits a `tracing` span per request with method, URI, request id, status,
/// and duration.
pub async fn logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = span!(Level::INFO, "request", %method, %uri, %request_id);
    let _enter = span.enter();

    let start = Instant::now();
    debug!("request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    info!(
        status = %response.status().as_u16(),
        duration_ms = %duration.as_millis(),
        "request completed"
    );

    response
}

pub fn cors_layer() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

pub fn compression_layer() -> tower_http::compression::CompressionLayer {
    tower_http::compression::CompressionLayer::new()
}

pub fn timeout_layer(timeout_secs: u64) -> tower::timeout::TimeoutLayer {
    tower::timeout::TimeoutLayer::new(std::time::Duration::from_secs(timeout_secs))
}
