//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate access checks and store calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod note_service;

pub use note_service::{
    ErrorKind, HistoryEntry, NoteService, NoteServiceError, NoteView, ServiceResult,
};
