//! Periodic recomputation poll

use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::{AppState, TickOutcome};

/// Recompute the running timer at a sub-second cadence until it stops.
///
/// Cadence only affects how smooth the display is; the remaining time is
/// always derived from the deadline. Missed ticks are skipped, never replayed.
pub async fn tick_poll_task(state: Arc<AppState>) {
    let mut ticker = interval(state.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match state.tick() {
            Ok(TickOutcome::Running { remaining_seconds }) => {
                debug!("Tick: {}s remaining", remaining_seconds);
            }
            Ok(TickOutcome::Completed) => {
                info!("Timer reached zero");
                break;
            }
            Ok(TickOutcome::Idle) => {
                debug!("Timer no longer running, stopping poll");
                break;
            }
            Err(e) => {
                error!("Tick failed: {}", e);
                break;
            }
        }
    }
}
