//! Error types for the Gateway's HTTP surface.
//!
//! Authorization denials are never represented here — they are
//! `AuthResult { allowed: false, .. }` values that flow all the way to a
//! `200 OK` response body, per §7. `GatewayError` covers the surrounding
//! control-flow failures: malformed requests, unknown tenants at the HTTP
//! layer, and a gateway that has not been started.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(String),

    // No separate `TenantError` type (named in §7's closed error set):
    // every tenant-resolution failure this gateway produces is "no such
    // tenant", which this variant already covers.
    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("gateway unavailable")]
    Unavailable,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            GatewayError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                },
            ),
            GatewayError::UnknownTenant(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "UNKNOWN_TENANT".to_string(),
                    message: msg.clone(),
                },
            ),
            GatewayError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "CONFLICT".to_string(),
                    message: msg.clone(),
                },
            ),
            GatewayError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse {
                    error: "UNAVAILABLE".to_string(),
                    message: "gateway is not running".to_string(),
                },
            ),
            GatewayError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                },
            ),
            GatewayError::Serialization(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "SERIALIZATION_ERROR".to_string(),
                    message: err.to_string(),
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub type GatewayResult<T> = Result<T, GatewayError>;
