//! Server configuration from environment.

use std::env;

use vayu_core::ServiceBounds;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Upstream monitoring-network feed. Empty means no upstream; the
    /// server runs on the seeded station set.
    pub feed_url: String,
    pub feed_token: Option<String>,
    /// Seconds between station refresh cycles.
    pub refresh_interval_secs: u64,
    /// Snapshots retained for forecasting, newest last.
    pub history_len: usize,
    /// Consecutive refresh failures before responses carry a stale warning.
    pub stale_after_failures: u32,
    pub bounds: ServiceBounds,
    /// Locations within this distance of each other get a graph edge.
    pub connectivity_radius_km: f64,
    /// Fallback query point when the client omits coordinates (city center).
    pub default_lat: f64,
    pub default_lng: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("VAYU_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            feed_url: env::var("VAYU_FEED_URL").unwrap_or_default(),
            feed_token: env::var("VAYU_FEED_TOKEN").ok().filter(|t| !t.is_empty()),
            refresh_interval_secs: env::var("VAYU_REFRESH_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            history_len: env::var("VAYU_HISTORY_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
            stale_after_failures: env::var("VAYU_STALE_AFTER_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            bounds: ServiceBounds::default(),
            connectivity_radius_km: env::var("VAYU_CONNECTIVITY_RADIUS_KM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16.0),
            default_lat: 28.6139,
            default_lng: 77.2090,
        }
    }
}
