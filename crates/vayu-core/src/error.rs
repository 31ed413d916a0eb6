//! Typed failures for the engine.
//!
//! Estimation and forecasting prefer graceful degradation (lower confidence,
//! fallback values) over returning an error; only the route optimizer has
//! genuine failure modes. `UpstreamDataStale` is surfaced as a warning while
//! a last good snapshot exists; it hardens into an error only when the feed
//! keeps failing and there is nothing to serve at all.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("coordinate ({lat}, {lng}) is outside the service area")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("no monitoring stations available")]
    NoStationsAvailable,

    #[error("no route found between the requested endpoints")]
    RouteNotFound,

    #[error("route search exceeded its node budget")]
    RouteTimeout,

    #[error("upstream feed is stale after {failures} consecutive refresh failures")]
    UpstreamDataStale { failures: u32 },
}
