//! Audit trail: append-only event log with retention cleanup.

pub mod log;
pub mod routes;

pub use log::{AuditEvent, AuditLog, DEFAULT_LIST_LIMIT};
