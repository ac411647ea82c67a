//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{error::RunnerError, state::Runner};

use super::responses::{error_status, ApiResponse, HealthResponse, ReportResponse, StatusResponse};

/// JSON body for the answer endpoints.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question: usize,
    pub option: usize,
}

type HandlerResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Build the rejection response for a failed runner call.
fn rejection(runner: &Runner, error: RunnerError) -> (StatusCode, Json<ApiResponse>) {
    warn!("request rejected: {}", error);
    let snapshot = runner.snapshot().ok();
    (
        error_status(&error),
        Json(ApiResponse::rejected(error.to_string(), snapshot)),
    )
}

fn accepted(runner: &Runner, message: &str) -> Json<ApiResponse> {
    Json(ApiResponse::accepted(
        message.to_string(),
        runner.snapshot().ok(),
    ))
}

/// Handle POST /assessment/start - request the run to begin
pub async fn start_handler(State(runner): State<Arc<Runner>>) -> HandlerResult {
    match runner.start() {
        Ok(_) => {
            info!("start endpoint called - awaiting candidate confirmation");
            Ok(accepted(&runner, "Start requested; confirmation required"))
        }
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/confirm - confirm and begin the countdown
pub async fn confirm_handler(State(runner): State<Arc<Runner>>) -> HandlerResult {
    match runner.confirm_start() {
        Ok(_) => {
            info!("confirm endpoint called - countdown started");
            Ok(accepted(&runner, "Start confirmed; countdown running"))
        }
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/cancel - back out of the confirmation prompt
pub async fn cancel_handler(State(runner): State<Arc<Runner>>) -> HandlerResult {
    match runner.cancel_start() {
        Ok(_) => {
            info!("cancel endpoint called - returned to not started");
            Ok(accepted(&runner, "Start cancelled"))
        }
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/answer - record a selection
pub async fn answer_handler(
    State(runner): State<Arc<Runner>>,
    Json(body): Json<AnswerRequest>,
) -> HandlerResult {
    match runner.select_answer(body.question, body.option) {
        Ok(()) => Ok(accepted(&runner, "Answer recorded")),
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/answer/toggle - toggle a multi-choice option
pub async fn toggle_answer_handler(
    State(runner): State<Arc<Runner>>,
    Json(body): Json<AnswerRequest>,
) -> HandlerResult {
    match runner.toggle_answer(body.question, body.option) {
        Ok(()) => Ok(accepted(&runner, "Answer toggled")),
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/next - move to the next question
pub async fn next_question_handler(State(runner): State<Arc<Runner>>) -> HandlerResult {
    match runner.next_question() {
        Ok(_) => Ok(accepted(&runner, "Moved to next question")),
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/previous - move to the previous question
pub async fn previous_question_handler(State(runner): State<Arc<Runner>>) -> HandlerResult {
    match runner.previous_question() {
        Ok(_) => Ok(accepted(&runner, "Moved to previous question")),
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle POST /assessment/advance - submit the current section
pub async fn advance_handler(State(runner): State<Arc<Runner>>) -> HandlerResult {
    match runner.advance_section() {
        Ok(state) => {
            info!("advance endpoint called - section submitted");
            let message = match state.phase {
                crate::state::Phase::Finished => "Section submitted; assessment finished",
                _ => "Section submitted; next section started",
            };
            Ok(accepted(&runner, message))
        }
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle GET /status - Return the run position and timer
pub async fn status_handler(
    State(runner): State<Arc<Runner>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let assessment = match runner.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("failed to snapshot run state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let timer = runner.timer_view();
    let (last_action, last_action_time) = runner.get_last_action();

    Ok(Json(StatusResponse {
        assessment,
        clock: timer.clock(),
        timer_active: timer.active,
        timer_remaining_seconds: timer.remaining_seconds,
        uptime: runner.get_uptime(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /report - score report of a finished run
pub async fn report_handler(
    State(runner): State<Arc<Runner>>,
) -> Result<Json<ReportResponse>, (StatusCode, Json<ApiResponse>)> {
    match runner.score_report() {
        Ok(report) => {
            let context = runner.context();
            Ok(Json(ReportResponse {
                interview_id: context.interview_id.clone(),
                tenant: context.tenant.clone(),
                report,
            }))
        }
        Err(e) => Err(rejection(&runner, e)),
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
