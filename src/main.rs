//! Assessment Runner - A state-managed HTTP server for timed assessments
//!
//! This is the main entry point for the assessment-runner application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use assessment_runner::{
    api::create_router, config::Config, model::AssessmentPlan, state::Runner,
    tasks::assessment_ticker_task, utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "assessment_runner={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting assessment-runner v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, plan={}, countdown={}s",
        config.host,
        config.port,
        config.plan.display(),
        config.countdown
    );

    // Load and validate the assessment plan before binding anything
    let plan = match AssessmentPlan::from_file(&config.plan) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Loaded plan for interview {} (tenant {}): {} section(s)",
        plan.context.interview_id,
        plan.context.tenant,
        plan.sections.len()
    );

    // Create the runner that owns all run state
    let runner = Arc::new(Runner::new(plan, config.countdown));

    // Start the 1-second ticker background task
    let ticker_runner = Arc::clone(&runner);
    tokio::spawn(async move {
        assessment_ticker_task(ticker_runner).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(runner);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /assessment/start         - Request the run to begin");
    info!("  POST /assessment/confirm       - Confirm and start the countdown");
    info!("  POST /assessment/cancel        - Back out of the confirmation");
    info!("  POST /assessment/answer        - Record a selection");
    info!("  POST /assessment/answer/toggle - Toggle a multi-choice option");
    info!("  POST /assessment/next          - Move to the next question");
    info!("  POST /assessment/previous      - Move to the previous question");
    info!("  POST /assessment/advance       - Submit the current section");
    info!("  GET  /status                   - Check run position and timer");
    info!("  GET  /report                   - Score report once finished");
    info!("  GET  /health                   - Health check");

    // Setup graceful shutdown; dropping the server also drops the ticker's
    // owner, clearing any live interval.
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
