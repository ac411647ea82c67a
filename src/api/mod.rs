//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::Runner;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(runner: Arc<Runner>) -> Router {
    Router::new()
        .route("/assessment/start", post(start_handler))
        .route("/assessment/confirm", post(confirm_handler))
        .route("/assessment/cancel", post(cancel_handler))
        .route("/assessment/answer", post(answer_handler))
        .route("/assessment/answer/toggle", post(toggle_answer_handler))
        .route("/assessment/next", post(next_question_handler))
        .route("/assessment/previous", post(previous_question_handler))
        .route("/assessment/advance", post(advance_handler))
        .route("/status", get(status_handler))
        .route("/report", get(report_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(runner)
}
