//! Audit ledger - append-only history of every state change

pub mod activities;
pub mod data;
pub mod models;

pub use data::{AuditEntryData, AuditFilterInput};
pub use models::{AuditAction, AuditActor, AuditEntry, AuditFilter, AuditTarget, NewAuditEntry};
