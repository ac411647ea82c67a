//! Display view of the active section timer

use serde::Serialize;

/// What a front end needs to render the countdown: whether a timer is live
/// and how many seconds it has left. Published on a watch channel once per
/// tick and on every section transition.
#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub active: bool,
    pub remaining_seconds: Option<u64>,
}

impl TimerView {
    /// No timer live (before the run starts, between runs, after finish).
    pub fn idle() -> Self {
        Self {
            active: false,
            remaining_seconds: None,
        }
    }

    /// A section timer live with `remaining_seconds` left.
    pub fn running(remaining_seconds: u64) -> Self {
        Self {
            active: true,
            remaining_seconds: Some(remaining_seconds),
        }
    }

    /// `MM:SS` rendering of the remaining time, when a timer is live.
    pub fn clock(&self) -> Option<String> {
        if !self.active {
            return None;
        }
        self.remaining_seconds
            .map(|secs| format!("{:02}:{:02}", secs / 60, secs % 60))
    }
}

impl Default for TimerView {
    fn default() -> Self {
        Self::idle()
    }
}
