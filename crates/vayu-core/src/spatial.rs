//! Spatial math for distance calculations and edge sampling.

use crate::models::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (Haversine formula).
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in kilometers.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance_m(a, b) / 1000.0
}

/// Point at `fraction` (0..=1) along the segment from `start` to `end`.
///
/// Linear interpolation in lat/lng space; adequate at the segment lengths a
/// city-scale route graph produces.
pub fn point_along(start: Coordinate, end: Coordinate, fraction: f64) -> Coordinate {
    let t = fraction.clamp(0.0, 1.0);
    Coordinate {
        lat: start.lat + (end.lat - start.lat) * t,
        lng: start.lng + (end.lng - start.lng) * t,
    }
}

/// Midpoint of a segment.
pub fn midpoint(start: Coordinate, end: Coordinate) -> Coordinate {
    point_along(start, end, 0.5)
}
