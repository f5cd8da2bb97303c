//! Identity directory contracts and SQLite implementation.
//!
//! # Responsibility
//! - Register identities and map usernames to stable user ids.
//!
//! # Invariants
//! - Usernames are validated before any SQL mutation.
//! - A username maps to at most one user id.

use crate::db::DbError;
use crate::model::identity::{validate_username, UserId, UsernameError};
use crate::repo::now_epoch_ms;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Identity directory error for registration and lookups.
#[derive(Debug)]
pub enum DirectoryError {
    InvalidUsername(UsernameError),
    UsernameTaken(String),
    Db(DbError),
    InvalidData(String),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername(err) => write!(f, "{err}"),
            Self::UsernameTaken(username) => write!(f, "username already taken: {username}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUsername(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UsernameTaken(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<UsernameError> for DirectoryError {
    fn from(value: UsernameError) -> Self {
        Self::InvalidUsername(value)
    }
}

impl From<DbError> for DirectoryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DirectoryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Directory interface for identity registration and username lookup.
pub trait IdentityDirectory {
    /// Registers one identity and returns its new user id.
    fn register_identity(&self, username: &str) -> DirectoryResult<UserId>;
    /// Resolves a username to its user id, if registered.
    fn resolve_username(&self, username: &str) -> DirectoryResult<Option<UserId>>;
    /// Looks up the username behind a user id, if registered.
    fn username_of(&self, user_id: UserId) -> DirectoryResult<Option<String>>;
}

/// SQLite-backed identity directory.
pub struct SqliteIdentityDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdentityDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IdentityDirectory for SqliteIdentityDirectory<'_> {
    fn register_identity(&self, username: &str) -> DirectoryResult<UserId> {
        validate_username(username)?;

        let user_id = Uuid::new_v4();

        // Immediate makes the uniqueness probe and the insert one unit.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let taken = tx
            .prepare("SELECT 1 FROM users WHERE username = ?1;")?
            .exists([username])?;
        if taken {
            return Err(DirectoryError::UsernameTaken(username.to_string()));
        }

        tx.execute(
            "INSERT INTO users (id, username, created_at)
             VALUES (?1, ?2, ?3);",
            params![user_id.to_string(), username, now_epoch_ms()],
        )?;
        tx.commit()?;

        Ok(user_id)
    }

    fn resolve_username(&self, username: &str) -> DirectoryResult<Option<UserId>> {
        let mut stmt = self.conn.prepare("SELECT id FROM users WHERE username = ?1;")?;

        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            let user_id = Uuid::parse_str(&text).map_err(|_| {
                DirectoryError::InvalidData(format!("invalid uuid value `{text}` in users.id"))
            })?;
            return Ok(Some(user_id));
        }

        Ok(None)
    }

    fn username_of(&self, user_id: UserId) -> DirectoryResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT username FROM users WHERE id = ?1;")?;

        let mut rows = stmt.query([user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }

        Ok(None)
    }
}
