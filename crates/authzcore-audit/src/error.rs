//! The audit plane's closed error vocabulary.
//!
//! A write failure here must never flip an `allowed = true` decision into a
//! denial (see `authzcore-gateway`'s pipeline) — it is reported through this
//! side-channel type while the decision itself stands.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit store write failed: {0}")]
    WriteFailed(String),
    #[error("audit export failed: {0}")]
    ExportFailed(String),
}

pub type AuditResult<T> = Result<T, AuditError>;
