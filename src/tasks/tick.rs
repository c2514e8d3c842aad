//! Periodic tick driving the countdown

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Poll the timer every `period` and publish the snapshot
pub async fn tick_task(state: Arc<AppState>, period: Duration) {
    info!("Starting tick task every {:?}", period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        match state.on_tick() {
            Ok(snapshot) => {
                debug!("Tick: {} ({:.2})", snapshot.time_string, snapshot.progress);
            }
            Err(e) => {
                error!("Failed to poll timer: {}", e);
            }
        }
    }
}
