//! Note and history-snapshot domain records.
//!
//! # Responsibility
//! - Define the canonical `Note` and `NoteUpdate` shapes read back from the
//!   store.
//! - Provide title/content validation used by every write path.
//!
//! # Invariants
//! - `owner` is set at creation and never appears in `shared_with`.
//! - `updated_at` always equals the newest snapshot's `timestamp`.
//! - Snapshot timestamps are non-decreasing within one note's history.

use crate::model::identity::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one note.
pub type NoteId = Uuid;

/// Stable identifier for one history snapshot.
pub type NoteUpdateId = Uuid;

/// Maximum note title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Canonical note record as materialized by the store.
///
/// `shared_with` is always fully loaded before access evaluation; there is
/// no lazy membership lookup behind this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable note id used for linking and auditing.
    pub id: NoteId,
    /// Display title, 1..=200 characters.
    pub title: String,
    /// Current full content; always equal to the newest snapshot.
    pub content: String,
    /// Creating identity; immutable and implicitly granted every level.
    pub owner: UserId,
    /// Non-owner identities granted read/write access.
    pub shared_with: BTreeSet<UserId>,
    /// Creation instant in epoch milliseconds, set by the store.
    pub created_at: i64,
    /// Newest snapshot instant in epoch milliseconds, set by the store.
    pub updated_at: i64,
}

impl Note {
    /// Returns whether `user` holds an explicit share grant.
    ///
    /// The owner is implicitly permitted and intentionally not part of the
    /// shared-with set, so this returns `false` for the owner.
    pub fn is_shared_with(&self, user: UserId) -> bool {
        self.shared_with.contains(&user)
    }
}

/// Immutable full-content snapshot of a note at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUpdate {
    /// Stable snapshot id; store-internal, never exposed through history.
    pub id: NoteUpdateId,
    /// Owning note.
    pub note_id: NoteId,
    /// Full note content at snapshot time, not a diff.
    pub content: String,
    /// Snapshot instant in epoch milliseconds, set by the store.
    pub timestamp: i64,
}

/// Field-level validation errors for user-supplied note values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    TitleTooLong { length: usize },
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { length } => write!(
                f,
                "title is {length} characters long; at most {MAX_TITLE_CHARS} allowed"
            ),
            Self::EmptyContent => write!(f, "content must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Validates one note title.
///
/// No trimming: whitespace-only titles are accepted, emptiness is byte-wise
/// and the length limit counts characters.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }

    let length = title.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(NoteValidationError::TitleTooLong { length });
    }

    Ok(())
}

/// Validates one note content value.
pub fn validate_content(content: &str) -> Result<(), NoteValidationError> {
    if content.is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}
