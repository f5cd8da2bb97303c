//! Note store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes, share grants and the append-only history.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate title/content before SQL mutations.
//! - A note and its newest snapshot always agree on content: creation and
//!   append both run inside one immediate transaction.
//! - Snapshot timestamps never decrease within one note's history.

use crate::db::DbError;
use crate::model::identity::UserId;
use crate::model::note::{
    validate_content, validate_title, Note, NoteId, NoteUpdate, NoteValidationError,
};
use crate::repo::now_epoch_ms;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Note store error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NoteNotFound(NoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NoteNotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface for note persistence, share grants and history.
pub trait NoteRepository {
    /// Persists one note and its initial snapshot; returns the stored note.
    fn create_note(&self, title: &str, content: &str, owner: UserId) -> RepoResult<Note>;
    /// Gets one note with its shared-with set fully materialized.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Appends one snapshot and advances the note's content atomically.
    fn append_update(&self, note_id: NoteId, content: &str) -> RepoResult<NoteUpdate>;
    /// Records one share grant. Duplicate detection is a service concern.
    fn add_share(&self, note_id: NoteId, user_id: UserId) -> RepoResult<()>;
    /// Lists all snapshots for one note, newest first.
    fn list_history(&self, note_id: NoteId) -> RepoResult<Vec<NoteUpdate>>;
}

/// SQLite-backed note store.
///
/// Holds a shared connection borrow so it can coexist with the identity
/// directory on one connection; write paths take their own immediate
/// transactions via [`Transaction::new_unchecked`].
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, title: &str, content: &str, owner: UserId) -> RepoResult<Note> {
        validate_title(title)?;
        validate_content(content)?;

        let note_id = Uuid::new_v4();
        let snapshot_id = Uuid::new_v4();
        let created_at = now_epoch_ms();

        // One transaction: a committed note always has its initial snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (id, title, content, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                note_id.to_string(),
                title,
                content,
                owner.to_string(),
                created_at,
            ],
        )?;
        tx.execute(
            "INSERT INTO note_updates (id, note_id, content, timestamp)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                snapshot_id.to_string(),
                note_id.to_string(),
                content,
                created_at,
            ],
        )?;
        tx.commit()?;

        Ok(Note {
            id: note_id,
            title: title.to_string(),
            content: content.to_string(),
            owner,
            shared_with: BTreeSet::new(),
            created_at,
            updated_at: created_at,
        })
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let id_text = id.to_string();
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, owner_id, created_at, updated_at
             FROM notes
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([id_text.as_str()])?;
        if let Some(row) = rows.next()? {
            let shared_with = load_shares_for_note(self.conn, id_text.as_str())?;
            return Ok(Some(parse_note_row(row, shared_with)?));
        }

        Ok(None)
    }

    fn append_update(&self, note_id: NoteId, content: &str) -> RepoResult<NoteUpdate> {
        validate_content(content)?;

        let note_id_text = note_id.to_string();
        let snapshot_id = Uuid::new_v4();

        // Immediate keeps concurrent writers from interleaving between the
        // content update and the snapshot insert.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let newest_prior: i64 = tx.query_row(
            "SELECT COALESCE(MAX(timestamp), 0)
             FROM note_updates
             WHERE note_id = ?1;",
            [note_id_text.as_str()],
            |row| row.get(0),
        )?;
        // Clamp against the newest prior snapshot so history stays
        // non-decreasing even if the wall clock steps backwards.
        let timestamp = now_epoch_ms().max(newest_prior);

        let changed = tx.execute(
            "UPDATE notes
             SET content = ?2, updated_at = ?3
             WHERE id = ?1;",
            params![note_id_text.as_str(), content, timestamp],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(note_id));
        }

        tx.execute(
            "INSERT INTO note_updates (id, note_id, content, timestamp)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                snapshot_id.to_string(),
                note_id_text.as_str(),
                content,
                timestamp,
            ],
        )?;
        tx.commit()?;

        Ok(NoteUpdate {
            id: snapshot_id,
            note_id,
            content: content.to_string(),
            timestamp,
        })
    }

    fn add_share(&self, note_id: NoteId, user_id: UserId) -> RepoResult<()> {
        // OR IGNORE: concurrent duplicate grants settle as membership-wins
        // instead of surfacing a constraint error.
        self.conn.execute(
            "INSERT OR IGNORE INTO note_shares (note_id, user_id, granted_at)
             VALUES (?1, ?2, ?3);",
            params![note_id.to_string(), user_id.to_string(), now_epoch_ms()],
        )?;
        Ok(())
    }

    fn list_history(&self, note_id: NoteId) -> RepoResult<Vec<NoteUpdate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, note_id, content, timestamp
             FROM note_updates
             WHERE note_id = ?1
             ORDER BY timestamp DESC, rowid DESC;",
        )?;

        // rowid breaks same-millisecond ties toward the later insert.
        let mut rows = stmt.query([note_id.to_string()])?;
        let mut updates = Vec::new();
        while let Some(row) = rows.next()? {
            updates.push(parse_update_row(row)?);
        }

        Ok(updates)
    }
}

fn parse_note_row(row: &Row<'_>, shared_with: BTreeSet<UserId>) -> RepoResult<Note> {
    Ok(Note {
        id: parse_uuid_column(row, "id", "notes.id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        owner: parse_uuid_column(row, "owner_id", "notes.owner_id")?,
        shared_with,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_update_row(row: &Row<'_>) -> RepoResult<NoteUpdate> {
    Ok(NoteUpdate {
        id: parse_uuid_column(row, "id", "note_updates.id")?,
        note_id: parse_uuid_column(row, "note_id", "note_updates.note_id")?,
        content: row.get("content")?,
        timestamp: row.get("timestamp")?,
    })
}

fn parse_uuid_column(row: &Row<'_>, column: &str, qualified: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {qualified}")))
}

fn load_shares_for_note(conn: &Connection, note_id: &str) -> RepoResult<BTreeSet<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id
         FROM note_shares
         WHERE note_id = ?1;",
    )?;

    let mut rows = stmt.query([note_id])?;
    let mut shared_with = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        let user_id = Uuid::parse_str(&text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{text}` in note_shares.user_id"))
        })?;
        shared_with.insert(user_id);
    }

    Ok(shared_with)
}
