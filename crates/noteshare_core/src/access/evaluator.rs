//! Pure allow/deny evaluation over materialized note state.

use crate::model::identity::UserId;
use crate::model::note::Note;
use serde::{Deserialize, Serialize};

/// Permission tier required by one note operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// View title, content and history.
    Read,
    /// Edit content.
    Write,
    /// Extend the shared-with set.
    Share,
}

impl AccessLevel {
    /// Stable lowercase name used in logs and error detail.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Share => "share",
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Requester is neither the owner nor in the shared-with set.
    NoGrant,
    /// The level is reserved for the note owner.
    OwnerOnly,
}

/// Outcome of evaluating one access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied {
        level: AccessLevel,
        reason: DenialReason,
    },
}

impl AccessDecision {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Evaluates whether `requester` may perform a `level` operation on `note`.
///
/// # Contract
/// - `Read`/`Write`: owner or any shared-with member.
/// - `Share`: owner only.
/// - Pure: no side effects, never fails for well-formed input.
pub fn evaluate(note: &Note, requester: UserId, level: AccessLevel) -> AccessDecision {
    if requester == note.owner {
        return AccessDecision::Granted;
    }

    match level {
        AccessLevel::Read | AccessLevel::Write => {
            if note.is_shared_with(requester) {
                AccessDecision::Granted
            } else {
                AccessDecision::Denied {
                    level,
                    reason: DenialReason::NoGrant,
                }
            }
        }
        AccessLevel::Share => AccessDecision::Denied {
            level,
            reason: DenialReason::OwnerOnly,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate, AccessDecision, AccessLevel, DenialReason};
    use crate::model::note::Note;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn note_with_shares(owner: Uuid, shared: &[Uuid]) -> Note {
        Note {
            id: Uuid::new_v4(),
            title: "board minutes".to_string(),
            content: "initial".to_string(),
            owner,
            shared_with: shared.iter().copied().collect::<BTreeSet<_>>(),
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    #[test]
    fn owner_is_granted_every_level() {
        let owner = Uuid::new_v4();
        let note = note_with_shares(owner, &[]);
        for level in [AccessLevel::Read, AccessLevel::Write, AccessLevel::Share] {
            assert!(evaluate(&note, owner, level).is_granted());
        }
    }

    #[test]
    fn shared_user_reads_and_writes_but_cannot_share() {
        let owner = Uuid::new_v4();
        let collaborator = Uuid::new_v4();
        let note = note_with_shares(owner, &[collaborator]);

        assert!(evaluate(&note, collaborator, AccessLevel::Read).is_granted());
        assert!(evaluate(&note, collaborator, AccessLevel::Write).is_granted());
        assert_eq!(
            evaluate(&note, collaborator, AccessLevel::Share),
            AccessDecision::Denied {
                level: AccessLevel::Share,
                reason: DenialReason::OwnerOnly,
            }
        );
    }

    #[test]
    fn stranger_is_denied_every_level() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let note = note_with_shares(owner, &[Uuid::new_v4()]);

        for level in [AccessLevel::Read, AccessLevel::Write] {
            assert_eq!(
                evaluate(&note, stranger, level),
                AccessDecision::Denied {
                    level,
                    reason: DenialReason::NoGrant,
                }
            );
        }
        assert!(!evaluate(&note, stranger, AccessLevel::Share).is_granted());
    }
}
