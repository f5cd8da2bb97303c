//! Domain model for multi-user notes and their edit history.
//!
//! # Responsibility
//! - Define the canonical records shared by store, evaluator and service.
//! - Own field-level validation for user-supplied values.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - A note's owner never appears in its shared-with set.
//! - History snapshots are immutable once written.

pub mod identity;
pub mod note;
