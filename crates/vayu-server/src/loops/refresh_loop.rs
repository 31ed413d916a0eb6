//! Station refresh loop.
//!
//! Periodically pulls the upstream feed, normalizes it into a snapshot, and
//! publishes it atomically. A failed cycle leaves the previous snapshot in
//! place and bumps the failure counter that drives stale-data warnings;
//! requests keep being served throughout.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;

use vayu_core::StationSnapshot;

use crate::config::Config;
use crate::feed::{self, FeedClient};
use crate::state::AppState;

pub async fn run_refresh_loop(state: Arc<AppState>, config: Config) {
    let client = FeedClient::new(&config.feed_url, config.feed_token.as_deref());

    if !client.has_upstream() {
        tracing::info!("No feed URL configured; serving the seeded station set");
        state.publish(StationSnapshot::new(feed::seed_stations(Utc::now()), Utc::now()));
        return;
    }

    let mut ticker = interval(Duration::from_secs(config.refresh_interval_secs.max(1)));
    loop {
        ticker.tick().await;

        match client.fetch_stations().await {
            Ok(stations) if !stations.is_empty() => {
                let count = stations.len();
                state.publish(StationSnapshot::new(stations, Utc::now()));
                tracing::debug!(stations = count, "Published station snapshot");
            }
            Ok(_) => {
                let failures = state.record_refresh_failure();
                tracing::warn!(failures, "Feed returned no usable stations");
                seed_if_never_published(&state);
            }
            Err(err) => {
                let failures = state.record_refresh_failure();
                tracing::warn!(failures, "Station refresh failed: {err:#}");
                seed_if_never_published(&state);
            }
        }
    }
}

/// A server that has never seen a good feed cycle still has to answer; fall
/// back to the seeded baseline rather than serving errors indefinitely.
fn seed_if_never_published(state: &AppState) {
    if state.snapshot().is_empty() {
        tracing::info!("Falling back to the seeded station set");
        state.publish(StationSnapshot::new(feed::seed_stations(Utc::now()), Utc::now()));
    }
}
