//! Audit trail: every score change, signal and gate verdict, in order.

pub mod event;
pub mod log;
pub mod replay;

pub use event::AuditEvent;
pub use log::{AuditRecord, AuditSink, AuditTrail, MemoryAuditLog};
pub use replay::{replay_scores, verdict_trace};
