//! User identity references and username discipline.
//!
//! The core never stores credentials; it only mirrors identities issued by
//! the external identity provider and validates the usernames it is handed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one verified user identity.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UserId = Uuid;

/// Maximum username length in characters.
pub const MAX_USERNAME_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Username validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    Empty,
    TooLong { length: usize },
    ForbiddenChars(String),
}

impl Display for UsernameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "username must not be empty"),
            Self::TooLong { length } => write!(
                f,
                "username is {length} characters long; at most {MAX_USERNAME_CHARS} allowed"
            ),
            Self::ForbiddenChars(value) => write!(
                f,
                "username `{value}` contains forbidden characters (letters, digits and @.+-_ only)"
            ),
        }
    }
}

impl Error for UsernameError {}

/// Validates one username against the directory contract.
///
/// # Contract
/// - Non-empty, at most [`MAX_USERNAME_CHARS`] characters.
/// - Word characters plus `@ . + - _` only.
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    if username.is_empty() {
        return Err(UsernameError::Empty);
    }

    let length = username.chars().count();
    if length > MAX_USERNAME_CHARS {
        return Err(UsernameError::TooLong { length });
    }

    if !USERNAME_RE.is_match(username) {
        return Err(UsernameError::ForbiddenChars(username.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_username, UsernameError, MAX_USERNAME_CHARS};

    #[test]
    fn accepts_typical_handles() {
        for username in ["johnwick", "john.wick", "j+w@continental", "j_w-77"] {
            assert!(validate_username(username).is_ok(), "rejected {username}");
        }
    }

    #[test]
    fn rejects_empty_username() {
        assert_eq!(validate_username(""), Err(UsernameError::Empty));
    }

    #[test]
    fn rejects_overlong_username() {
        let username = "a".repeat(MAX_USERNAME_CHARS + 1);
        assert_eq!(
            validate_username(&username),
            Err(UsernameError::TooLong {
                length: MAX_USERNAME_CHARS + 1
            })
        );
    }

    #[test]
    fn length_limit_counts_characters_not_bytes() {
        let username = "ü".repeat(MAX_USERNAME_CHARS);
        assert!(validate_username(&username).is_ok());
    }

    #[test]
    fn rejects_whitespace_and_punctuation() {
        for username in ["john wick", "john!", "a/b", "tabs\there"] {
            assert!(
                matches!(
                    validate_username(username),
                    Err(UsernameError::ForbiddenChars(_))
                ),
                "accepted {username}"
            );
        }
    }
}
