//! Assessment ticker background task

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::state::{Runner, TickOutcome};

/// Background task that delivers 1-second ticks to the runner while it is in
/// a timed phase (the pre-start countdown or an active section).
///
/// The task sits on the runner's event stream. When an event shows the
/// runner entering a timed phase it runs an interval loop calling
/// [`Runner::tick`], watching the stream at the same time so a user-driven
/// phase exit stops the loop right away instead of waiting out the current
/// second. Ticks that land after a phase exit anyway are rejected by the
/// runner as stale.
pub async fn assessment_ticker_task(runner: Arc<Runner>) {
    info!("starting assessment ticker task");

    let mut events = runner.subscribe();

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("ticker received event: {:?}", event);
                if !runner.in_timed_phase() {
                    continue;
                }

                debug!("timed phase entered, ticking every second");
                let mut interval = tokio::time::interval(Duration::from_secs(1));
                // The first interval tick resolves immediately; consume it so
                // the first delivered tick lands a full second after entry.
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            match runner.tick() {
                                Ok(TickOutcome::Stale) => {
                                    debug!("tick arrived outside a timed phase, stopping");
                                    break;
                                }
                                Ok(TickOutcome::Expired { finished: true }) => {
                                    info!("final section expired, run finished");
                                    break;
                                }
                                Ok(_) => {}
                                Err(e) => {
                                    error!("tick failed: {}", e);
                                    break;
                                }
                            }
                        }

                        received = events.recv() => {
                            match received {
                                Ok(event) => {
                                    debug!("ticker received event while ticking: {:?}", event);
                                    if !runner.in_timed_phase() {
                                        debug!("timed phase exited, stopping ticker loop");
                                        break;
                                    }
                                }
                                Err(RecvError::Lagged(skipped)) => {
                                    warn!("ticker lagged behind {} events", skipped);
                                }
                                Err(RecvError::Closed) => return,
                            }
                        }
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("ticker lagged behind {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
