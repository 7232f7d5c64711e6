//! Authzcore Capability - capability tokens, scope matching, rate limiting,
//! and the capability manager
//!
//! This crate owns the security-critical decision path: issuing and
//! verifying capability tokens, matching and narrowing hierarchical scopes,
//! admission-controlling via token-bucket rate limiting, and the session
//! fast path that makes repeated authorization checks sub-millisecond.

pub mod error;
pub mod manager;
pub mod rate_limiter;
pub mod scope;
pub mod session;
pub mod token;

pub use error::{AuthzError, AuthzResult, ConfigError, RateLimitError, ScopeError, VerifyError};
pub use manager::{denial, AuthResult, CapabilityManager, MAX_DELEGATION_DEPTH};
pub use rate_limiter::{RateLimitConfig, RateLimiterStats, SessionRateLimiter, DEFAULT_MAX_SESSIONS};
pub use session::{SessionCache, SessionEntry, DEFAULT_SESSION_CACHE_SIZE};
pub use token::Capability;
