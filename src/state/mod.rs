//! State management module
//!
//! Everything mutable about a run lives here: the lifecycle position, the
//! active section's answers, the timer view, and the runner that owns them.

pub mod answers;
pub mod run_state;
pub mod runner;
pub mod timer_view;

// Re-export main types
pub use answers::{AnswerSet, Selection};
pub use run_state::{Phase, RunState};
pub use runner::{Runner, RunnerEvent, Snapshot, TickOutcome};
pub use timer_view::TimerView;
