//! Core domain logic for NoteShare.
//! This crate is the single source of truth for access and history invariants.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{evaluate, AccessDecision, AccessLevel, DenialReason};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::identity::{validate_username, UserId, UsernameError};
pub use model::note::{Note, NoteId, NoteUpdate, NoteValidationError};
pub use repo::directory_repo::{
    DirectoryError, DirectoryResult, IdentityDirectory, SqliteIdentityDirectory,
};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_service::{
    ErrorKind, HistoryEntry, NoteService, NoteServiceError, NoteView, ServiceResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "ok"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
