//! The closed error vocabulary of the capability layer.
//!
//! Authorization *denials* are never errors (see `AuthResult` in
//! `manager.rs`); these variants are for malformed requests to the
//! issuing/delegation/verification API itself.

use thiserror::Error;

use authzcore_crypto::CryptoError;

#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("malformed scope string: {0}")]
    Malformed(String),
    #[error("child scope '{child}' is not a subset of parent scope '{parent}'")]
    NotNarrower { parent: String, child: String },
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("signature invalid")]
    SignatureInvalid,
    #[error("capability expired")]
    Expired,
    #[error("capability revoked")]
    Revoked,
    #[error("delegation chain invalid: {reason}")]
    ChainInvalid { reason: String },
    #[error("delegation chain depth {depth} exceeds maximum {max}")]
    ChainDepthExceeded { depth: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid scope: {0}")]
    InvalidScope(String),
    #[error("expires_in must be positive, got {0}")]
    NonPositiveExpiry(i64),
}

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("rate limit exceeded for key {0}")]
    Exceeded(String),
}

/// The closed set of failures the capability layer can report to a caller.
/// Authorization decisions themselves go through `AuthResult`, never this
/// type.
#[derive(Error, Debug)]
pub enum AuthzError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}

pub type AuthzResult<T> = Result<T, AuthzError>;
