//! Lifecycle position of a run

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the assessment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Confirming,
    CountingDown,
    InProgress,
    /// Transient: a section just closed and the next one (or the finish
    /// hand-off) loads in the same call. Never observable between calls.
    SectionComplete,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Phase::NotStarted => "not started",
            Phase::Confirming => "awaiting confirmation",
            Phase::CountingDown => "counting down",
            Phase::InProgress => "in progress",
            Phase::SectionComplete => "between sections",
            Phase::Finished => "finished",
        };
        f.write_str(text)
    }
}

/// Mutable run position: phase, indices, timers, and per-section completion
/// flags. Owned by the [`Runner`](super::Runner) behind a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunState {
    pub phase: Phase,
    /// Pre-start countdown steps left; meaningful only while `CountingDown`.
    pub countdown_remaining: u32,
    pub section_index: usize,
    pub question_index: usize,
    /// Seconds left on the active section's timer; meaningful only while
    /// `InProgress`.
    pub remaining_seconds: u64,
    pub completed: Vec<bool>,
}

impl RunState {
    pub fn new(section_count: usize) -> Self {
        Self {
            phase: Phase::NotStarted,
            countdown_remaining: 0,
            section_index: 0,
            question_index: 0,
            remaining_seconds: 0,
            completed: vec![false; section_count],
        }
    }

    /// Phases in which the 1-second ticker must be running.
    pub fn is_timed(&self) -> bool {
        matches!(self.phase, Phase::CountingDown | Phase::InProgress)
    }

    pub fn all_sections_complete(&self) -> bool {
        self.completed.iter().all(|done| *done)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|done| **done).count()
    }
}
