//! Access control evaluation for note operations.
//!
//! # Responsibility
//! - Decide allow/deny for one (requester, note, level) triple.
//! - Keep permission rules in one pure, storage-free place.
//!
//! # Invariants
//! - Evaluation never touches the store; `shared_with` arrives materialized.
//! - Denials carry a typed reason; evaluation itself never fails.

pub mod evaluator;

pub use evaluator::{evaluate, AccessDecision, AccessLevel, DenialReason};
