//! Assessment Runner - A state-managed HTTP server for timed assessments
//!
//! This library drives a candidate through an ordered sequence of timed
//! question sections: a confirmation gate, a short pre-start countdown, one
//! answer set and countdown timer per section, strict in-order section
//! completion (forced on timer expiry), and a final hand-off carrying the
//! invocation context to the next interview pipeline stage.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod scoring;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::RunnerError;
pub use model::AssessmentPlan;
pub use state::Runner;
pub use utils::signals::shutdown_signal;
