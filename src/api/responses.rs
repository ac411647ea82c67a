//! API response structures

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::RunnerError,
    scoring::ScoreReport,
    state::Snapshot,
};

/// API response structure for transition endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Snapshot>,
}

impl ApiResponse {
    pub fn new(status: String, message: String, assessment: Option<Snapshot>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            assessment,
        }
    }

    /// A transition that was accepted and applied.
    pub fn accepted(message: String, assessment: Option<Snapshot>) -> Self {
        Self::new("accepted".to_string(), message, assessment)
    }

    /// A call the runner rejected; the state machine is unchanged.
    pub fn rejected(message: String, assessment: Option<Snapshot>) -> Self {
        Self::new("rejected".to_string(), message, assessment)
    }
}

/// Enhanced status response with timer information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub assessment: Snapshot,
    pub timer_active: bool,
    pub timer_remaining_seconds: Option<u64>,
    /// `MM:SS` rendering of the active timer, when one is live.
    pub clock: Option<String>,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Score report plus the hand-off context for the next pipeline stage.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub interview_id: String,
    pub tenant: String,
    pub report: ScoreReport,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// HTTP status for a rejected runner call: client mistakes map to 4xx, lock
/// poisoning to 500.
pub fn error_status(error: &RunnerError) -> axum::http::StatusCode {
    use axum::http::StatusCode;

    match error {
        RunnerError::IndexOutOfRange { .. } => StatusCode::BAD_REQUEST,
        RunnerError::InvalidTransition { .. } => StatusCode::CONFLICT,
        RunnerError::IncompleteSection { .. } => StatusCode::CONFLICT,
        RunnerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
