//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate model fields before SQL mutations.
//! - Repository APIs return semantic errors (`NoteNotFound`) in addition to
//!   DB transport errors.
//! - All write timestamps are stamped store-side, in epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

pub mod directory_repo;
pub mod note_repo;

/// Current wall-clock instant in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
