//! In-memory station store.
//!
//! The station network is replaced wholesale each refresh cycle, so the
//! store publishes immutable snapshots behind an `RwLock<Arc<_>>`: readers
//! clone the `Arc` and work against a consistent view while the next
//! refresh swaps in its successor. No request ever observes a half-updated
//! network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use vayu_core::{RouteGraph, StationSnapshot};

use crate::config::Config;
use crate::locations;

/// Whether responses should carry a stale-data warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleStatus {
    Fresh,
    Stale { failures: u32 },
}

pub struct AppState {
    config: Config,
    graph: RouteGraph,
    current: RwLock<Arc<StationSnapshot>>,
    /// Past snapshots for forecasting, oldest first, current last.
    history: RwLock<VecDeque<Arc<StationSnapshot>>>,
    refresh_failures: AtomicU32,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let graph =
            RouteGraph::connect_within(locations::named_locations(), config.connectivity_radius_km);
        Self {
            config,
            graph,
            current: RwLock::new(Arc::new(StationSnapshot::empty(Utc::now()))),
            history: RwLock::new(VecDeque::new()),
            refresh_failures: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    /// The latest published snapshot. Cheap; clones an `Arc`.
    pub fn snapshot(&self) -> Arc<StationSnapshot> {
        self.current
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Snapshot history for forecasting, oldest first, current last.
    pub fn history(&self) -> Vec<Arc<StationSnapshot>> {
        self.history
            .read()
            .map(|guard| guard.iter().cloned().collect())
            .unwrap_or_else(|poisoned| poisoned.into_inner().iter().cloned().collect())
    }

    /// Atomically publish a fresh snapshot and append it to the history,
    /// evicting the oldest entry past the retention limit. Resets the
    /// failure counter.
    pub fn publish(&self, snapshot: StationSnapshot) {
        let snapshot = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => *guard = snapshot.clone(),
            Err(poisoned) => *poisoned.into_inner() = snapshot.clone(),
        }
        let mut history = match self.history.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        history.push_back(snapshot);
        while history.len() > self.config.history_len.max(1) {
            history.pop_front();
        }
        self.refresh_failures.store(0, Ordering::SeqCst);
    }

    /// Record a failed refresh; the previous snapshot stays published.
    pub fn record_refresh_failure(&self) -> u32 {
        self.refresh_failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn stale_status(&self) -> StaleStatus {
        let failures = self.refresh_failures.load(Ordering::SeqCst);
        if failures >= self.config.stale_after_failures {
            StaleStatus::Stale { failures }
        } else {
            StaleStatus::Fresh
        }
    }
}
