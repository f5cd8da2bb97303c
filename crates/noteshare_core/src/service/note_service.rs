//! Note use-case service.
//!
//! # Responsibility
//! - Provide the requester-facing create/get/update/share/history APIs.
//! - Run the access evaluator before every read or mutation.
//! - Map store and directory errors into the transport-facing taxonomy.
//!
//! # Invariants
//! - Mutations resolve the note and check access before touching input
//!   payloads, so unauthorized callers never learn about malformed input.
//! - `share_note` checks membership against a per-call snapshot and stops at
//!   the first rejected username, keeping earlier grants from the same call.
//! - The owner never enters the shared-with set.

use crate::access::{evaluate, AccessDecision, AccessLevel};
use crate::model::identity::UserId;
use crate::model::note::{validate_content, validate_title, Note, NoteId, NoteValidationError};
use crate::repo::directory_repo::{DirectoryError, IdentityDirectory};
use crate::repo::note_repo::{NoteRepository, RepoError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Title or content failed model validation.
    InvalidInput(NoteValidationError),
    /// Share target is the note's owner.
    SelfShare(String),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Share target username is not registered.
    UnknownUser(String),
    /// Requester lacks the required access level.
    Forbidden(AccessLevel),
    /// Share target already has access.
    AlreadyShared(String),
    /// Note store failure.
    Storage(RepoError),
    /// Identity directory failure.
    Directory(DirectoryError),
}

/// Coarse error class exposed to transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Forbidden,
    Conflict,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

impl NoteServiceError {
    /// Classifies this error for transport-level status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::SelfShare(_) => ErrorKind::InvalidInput,
            Self::NoteNotFound(_) | Self::UnknownUser(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::AlreadyShared(_) => ErrorKind::Conflict,
            Self::Storage(_) | Self::Directory(_) => ErrorKind::Storage,
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::SelfShare(username) => {
                write!(f, "cannot share a note with its owner: {username}")
            }
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::UnknownUser(username) => write!(f, "unknown user: {username}"),
            Self::Forbidden(level) => write!(f, "{} access denied", level.as_str()),
            Self::AlreadyShared(username) => write!(f, "note already shared with: {username}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Directory(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Directory(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::Storage(other),
        }
    }
}

impl From<DirectoryError> for NoteServiceError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

/// Read projection returned by `get_note`: title and current content only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    pub title: String,
    pub content: String,
}

/// History projection returned by `get_history`; snapshot ids stay internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub content: String,
    pub timestamp: i64,
}

/// Note service facade over store and directory implementations.
pub struct NoteService<R: NoteRepository, D: IdentityDirectory> {
    notes: R,
    directory: D,
}

impl<R: NoteRepository, D: IdentityDirectory> NoteService<R, D> {
    /// Creates a service using the provided store and directory.
    pub fn new(notes: R, directory: D) -> Self {
        Self { notes, directory }
    }

    /// Creates one note owned by the requester and returns its id.
    ///
    /// The initial content snapshot is recorded in the same store
    /// transaction as the note itself.
    pub fn create_note(
        &self,
        requester: UserId,
        title: &str,
        content: &str,
    ) -> ServiceResult<NoteId> {
        validate_title(title)?;
        validate_content(content)?;

        let note = self.notes.create_note(title, content, requester)?;
        Ok(note.id)
    }

    /// Gets one note's title and current content.
    ///
    /// Requires read access: owner or member of the shared-with set.
    pub fn get_note(&self, requester: UserId, note_id: NoteId) -> ServiceResult<NoteView> {
        let note = self.require_note(note_id)?;
        require_access(&note, requester, AccessLevel::Read)?;

        Ok(NoteView {
            title: note.title,
            content: note.content,
        })
    }

    /// Replaces the note's content and appends one history snapshot.
    ///
    /// Requires write access. Content validation runs after the access
    /// check, so unauthorized callers always see `Forbidden`.
    pub fn update_note(
        &self,
        requester: UserId,
        note_id: NoteId,
        new_content: &str,
    ) -> ServiceResult<()> {
        let note = self.require_note(note_id)?;
        require_access(&note, requester, AccessLevel::Write)?;
        validate_content(new_content)?;

        self.notes.append_update(note_id, new_content)?;
        Ok(())
    }

    /// Grants read/write access to the listed usernames, in order.
    ///
    /// Owner only. Stops at the first unknown, duplicate or self-targeting
    /// username; grants already applied by this call stay in place. An
    /// empty list is a successful no-op.
    pub fn share_note(
        &self,
        requester: UserId,
        note_id: NoteId,
        usernames: &[String],
    ) -> ServiceResult<()> {
        let note = self.require_note(note_id)?;
        require_access(&note, requester, AccessLevel::Share)?;

        // Membership snapshot for this call; grows with each applied grant
        // so duplicates within the list are caught too.
        let mut members = note.shared_with.clone();
        for username in usernames {
            let user_id = self
                .directory
                .resolve_username(username)?
                .ok_or_else(|| NoteServiceError::UnknownUser(username.clone()))?;
            if user_id == note.owner {
                return Err(NoteServiceError::SelfShare(username.clone()));
            }
            if !members.insert(user_id) {
                return Err(NoteServiceError::AlreadyShared(username.clone()));
            }
            self.notes.add_share(note_id, user_id)?;
        }

        Ok(())
    }

    /// Lists content snapshots for one note, newest first.
    ///
    /// Requires read access. A freshly created note has exactly one entry.
    pub fn get_history(
        &self,
        requester: UserId,
        note_id: NoteId,
    ) -> ServiceResult<Vec<HistoryEntry>> {
        let note = self.require_note(note_id)?;
        require_access(&note, requester, AccessLevel::Read)?;

        let updates = self.notes.list_history(note_id)?;
        Ok(updates
            .into_iter()
            .map(|update| HistoryEntry {
                content: update.content,
                timestamp: update.timestamp,
            })
            .collect())
    }

    fn require_note(&self, note_id: NoteId) -> ServiceResult<Note> {
        self.notes
            .get_note(note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))
    }
}

fn require_access(note: &Note, requester: UserId, level: AccessLevel) -> ServiceResult<()> {
    match evaluate(note, requester, level) {
        AccessDecision::Granted => Ok(()),
        AccessDecision::Denied { level, .. } => Err(NoteServiceError::Forbidden(level)),
    }
}
