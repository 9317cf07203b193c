//! Protocol states for the write and read paths.
//!
//! Both paths are linear: a `Progress` only ever moves to a later state. A
//! failed attempt is never rewound; the caller starts the operation again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, AnchorResult};

/// Write path: `Created -> Encrypted -> Fingerprinted -> Submitted -> Anchored`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteState {
    Created,
    Encrypted,
    Fingerprinted,
    Submitted,
    Anchored,
}

/// Read path: `Retrieved -> Decrypted -> Reverified -> {terminal}`
///
/// The four terminal states share a rank; exactly one of them ends a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadState {
    Retrieved,
    Decrypted,
    Reverified,
    Verified,
    Mismatched,
    /// Ledger timed out or could not be reached
    Unreachable,
    /// Ledger answered but holds no record for the document
    Unanchored,
}

/// A state that belongs to a linear protocol path
pub trait Stage: Copy + fmt::Debug + Eq {
    /// Position along the path; terminal alternatives share a rank
    fn rank(self) -> u8;
}

impl Stage for WriteState {
    fn rank(self) -> u8 {
        self as u8
    }
}

impl Stage for ReadState {
    fn rank(self) -> u8 {
        match self {
            ReadState::Retrieved => 0,
            ReadState::Decrypted => 1,
            ReadState::Reverified => 2,
            ReadState::Verified
            | ReadState::Mismatched
            | ReadState::Unreachable
            | ReadState::Unanchored => 3,
        }
    }
}

impl ReadState {
    pub fn is_terminal(self) -> bool {
        self.rank() == 3
    }
}

/// Forward-only position on a protocol path, with the states visited so far
#[derive(Debug, Clone)]
pub struct Progress<S: Stage> {
    current: S,
    trail: Vec<S>,
}

impl<S: Stage> Progress<S> {
    pub fn start(initial: S) -> Self {
        Self {
            current: initial,
            trail: vec![initial],
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// Move to `next`, which must be strictly later on the path
    pub fn advance(&mut self, next: S) -> AnchorResult<()> {
        let current = self.current();
        if next.rank() <= current.rank() {
            return Err(AnchorError::InvalidTransition {
                from: format!("{current:?}"),
                to: format!("{next:?}"),
            });
        }
        tracing::trace!(from = ?current, to = ?next, "protocol transition");
        self.current = next;
        self.trail.push(next);
        Ok(())
    }

    pub fn trail(&self) -> &[S] {
        &self.trail
    }
}
