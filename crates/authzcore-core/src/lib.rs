//! Authzcore Core - shared identifiers and time primitives
//!
//! Foundational types used by every other crate in the workspace: random
//! 128-bit identifiers for capabilities and sessions, and the time helpers
//! the hot path needs (wall-clock seconds for expiry, monotonic microseconds
//! for latency measurement).

pub mod ids;
pub mod time;

pub use ids::{CapabilityId, IdParseError, SessionId};
pub use time::{micros_between, unix_timestamp};
