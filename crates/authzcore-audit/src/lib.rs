//! Authzcore Audit - the append-only audit event plane: taxonomy, store,
//! filtered query, aggregate stats, and export.
//!
//! Every authorization decision and revocation the gateway makes is
//! recorded here. The store never blocks or denies an authorization on
//! write failure — see [`error::AuditError`].

pub mod aggregator;
pub mod error;
pub mod event;
pub mod export;
pub mod filter;
pub mod stats;
pub mod store;

pub use aggregator::{AuditAggregator, DEFAULT_QUERY_LIMIT};
pub use error::{AuditError, AuditResult};
pub use event::{AuditEvent, AuditEventType};
pub use export::{export_csv, export_json};
pub use filter::AuditFilter;
pub use stats::AuditStats;
pub use store::{AuditStore, InMemoryAuditStore, DEFAULT_RING_SIZE};
