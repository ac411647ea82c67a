//! Error taxonomy for the assessment runner
//!
//! All variants are local, recoverable conditions: an invalid call is
//! rejected and the state machine stays where it was. Timer-driven forced
//! completion is a normal transition and never produces an error.

use thiserror::Error;

use crate::state::Phase;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunnerError {
    /// A transition method was called from a phase that does not permit it.
    #[error("cannot {action} while the assessment is {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },

    /// A question or option index fell outside the active section's bounds.
    #[error("{what} index {index} is out of range (0..{len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A user-initiated section advance was attempted with unanswered
    /// questions remaining. Reported rather than silently blocked so the
    /// caller can prompt the candidate.
    #[error("{unanswered} unanswered question(s) remain in this section")]
    IncompleteSection { unanswered: usize },

    /// A state lock was poisoned. Should not happen in practice since no
    /// code path panics while holding a lock.
    #[error("internal state error: {0}")]
    Internal(String),
}
