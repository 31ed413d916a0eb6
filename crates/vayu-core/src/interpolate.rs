//! Spatial interpolation of station readings.
//!
//! Estimates the pollutant vector (and from it the AQI) at an arbitrary
//! coordinate using inverse-distance weighting over the k nearest stations.
//! A query point sitting on a station short-circuits to that station's
//! reading before any weights are computed, so the weighting step never sees
//! a zero distance.

use crate::aqi;
use crate::error::EngineError;
use crate::models::{
    AqiEstimate, Coordinate, EstimateSource, Pollutant, PollutantVector, StationSnapshot,
};
use crate::spatial::haversine_distance_m;
use serde::{Deserialize, Serialize};

/// A station closer than this is treated as coincident with the query point
/// and its reading is returned verbatim.
pub const STATION_MATCH_EPSILON_M: f64 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolatorConfig {
    /// Stations blended per estimate (fewer if the network is sparser).
    pub k_neighbors: usize,
    /// Inverse-distance weighting exponent.
    pub idw_power: f64,
    /// Stations beyond this radius are ignored; if none remain the estimate
    /// degrades to the network-wide mean.
    pub max_search_radius_km: f64,
}

impl Default for InterpolatorConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 4,
            idw_power: 2.0,
            max_search_radius_km: 25.0,
        }
    }
}

/// Estimate AQI and pollutant concentrations at `location`.
///
/// Fails only when the snapshot has no stations at all or the coordinate is
/// not a usable point; everything else degrades gracefully.
pub fn estimate(
    snapshot: &StationSnapshot,
    location: Coordinate,
    config: &InterpolatorConfig,
) -> Result<AqiEstimate, EngineError> {
    if !location.is_valid() {
        return Err(EngineError::InvalidCoordinate {
            lat: location.lat,
            lng: location.lng,
        });
    }
    if snapshot.is_empty() {
        return Err(EngineError::NoStationsAvailable);
    }

    // Distances to every station, nearest first. Ties broken by station id
    // via the snapshot's stable ordering.
    let mut by_distance: Vec<(usize, f64)> = snapshot
        .stations
        .iter()
        .enumerate()
        .map(|(idx, station)| (idx, haversine_distance_m(location, station.location)))
        .collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (nearest_idx, nearest_m) = by_distance[0];
    if nearest_m < STATION_MATCH_EPSILON_M {
        let station = &snapshot.stations[nearest_idx];
        return Ok(AqiEstimate {
            aqi: aqi::aqi_from_pollutants(&station.readings),
            location,
            pollutants: station.readings,
            source: EstimateSource::Station(station.id.clone()),
            degraded: false,
        });
    }

    let radius_m = config.max_search_radius_km * 1000.0;
    let selected: Vec<(usize, f64)> = by_distance
        .into_iter()
        .filter(|&(_, dist)| dist <= radius_m)
        .take(config.k_neighbors.max(1))
        .collect();

    if selected.is_empty() {
        // Nothing within range: fall back to the network-wide mean and flag
        // the estimate as degraded instead of failing the request.
        let mean = snapshot
            .mean_readings()
            .ok_or(EngineError::NoStationsAvailable)?;
        return Ok(AqiEstimate {
            aqi: aqi::aqi_from_pollutants(&mean),
            location,
            pollutants: mean,
            source: EstimateSource::Interpolated,
            degraded: true,
        });
    }

    let mut blended = PollutantVector::default();
    let mut weight_sum = 0.0;
    let weights: Vec<f64> = selected
        .iter()
        .map(|&(_, dist)| 1.0 / dist.powf(config.idw_power))
        .collect();
    for weight in &weights {
        weight_sum += weight;
    }
    for pollutant in Pollutant::ALL {
        let weighted: f64 = selected
            .iter()
            .zip(&weights)
            .map(|(&(idx, _), weight)| snapshot.stations[idx].readings.get(pollutant) * weight)
            .sum();
        blended.set(pollutant, weighted / weight_sum);
    }

    Ok(AqiEstimate {
        aqi: aqi::aqi_from_pollutants(&blended),
        location,
        pollutants: blended,
        source: EstimateSource::Interpolated,
        degraded: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonitoringStation;
    use chrono::Utc;

    fn station(id: &str, lat: f64, lng: f64, pm25: f64) -> MonitoringStation {
        let mut readings = PollutantVector::default();
        readings.set(Pollutant::Pm25, pm25);
        MonitoringStation {
            id: id.to_string(),
            name: id.to_string(),
            location: Coordinate::new(lat, lng),
            readings,
            recorded_at: Utc::now(),
        }
    }

    fn snapshot(stations: Vec<MonitoringStation>) -> StationSnapshot {
        StationSnapshot::new(stations, Utc::now())
    }

    #[test]
    fn coincident_point_returns_station_verbatim() {
        let snap = snapshot(vec![
            station("anand-vihar", 28.6469, 77.3160, 180.0),
            station("rk-puram", 28.5632, 77.1865, 90.0),
        ]);
        let estimate = estimate(
            &snap,
            Coordinate::new(28.6469, 77.3160),
            &InterpolatorConfig::default(),
        )
        .unwrap();
        assert_eq!(
            estimate.source,
            EstimateSource::Station("anand-vihar".to_string())
        );
        assert_eq!(estimate.pollutants.pm25, 180.0);
        assert!(!estimate.degraded);
    }

    #[test]
    fn midpoint_aqi_lies_strictly_between_station_aqis() {
        // pm25 43.2 ug/m3 sits at AQI ~120, 150.4 ug/m3 at AQI 200.
        let low = station("low", 28.60, 77.20, 43.2);
        let high = station("high", 28.65, 77.25, 150.4);
        let low_aqi = aqi::aqi_from_pollutants(&low.readings);
        let high_aqi = aqi::aqi_from_pollutants(&high.readings);
        assert!((low_aqi - 120.0).abs() < 1.0, "low anchor {low_aqi}");
        assert!((high_aqi - 200.0).abs() < 1.0, "high anchor {high_aqi}");

        let snap = snapshot(vec![low, high]);
        let mid = estimate(
            &snap,
            Coordinate::new(28.625, 77.225),
            &InterpolatorConfig::default(),
        )
        .unwrap();
        assert!(
            mid.aqi > low_aqi && mid.aqi < high_aqi,
            "midpoint AQI {} not inside ({low_aqi}, {high_aqi})",
            mid.aqi
        );
        assert_eq!(mid.source, EstimateSource::Interpolated);
    }

    #[test]
    fn closer_station_dominates_the_blend() {
        let snap = snapshot(vec![
            station("near", 28.61, 77.21, 100.0),
            station("far", 28.75, 77.35, 200.0),
        ]);
        let estimate = estimate(
            &snap,
            Coordinate::new(28.612, 77.212),
            &InterpolatorConfig::default(),
        )
        .unwrap();
        assert!(
            estimate.pollutants.pm25 < 110.0,
            "blend {} pulled too far toward the distant station",
            estimate.pollutants.pm25
        );
    }

    #[test]
    fn out_of_radius_query_degrades_to_network_mean() {
        let snap = snapshot(vec![
            station("s1", 28.60, 77.20, 60.0),
            station("s2", 28.65, 77.25, 120.0),
        ]);
        // Inside the service area but ~100 km from the network.
        let estimate = estimate(
            &snap,
            Coordinate::new(27.6, 76.2),
            &InterpolatorConfig::default(),
        )
        .unwrap();
        assert!(estimate.degraded);
        assert!((estimate.pollutants.pm25 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_snapshot_is_an_error() {
        let snap = StationSnapshot::empty(Utc::now());
        let result = estimate(
            &snap,
            Coordinate::new(28.61, 77.21),
            &InterpolatorConfig::default(),
        );
        assert_eq!(result.unwrap_err(), EngineError::NoStationsAvailable);
    }

    #[test]
    fn invalid_coordinate_is_rejected() {
        let snap = snapshot(vec![station("s1", 28.60, 77.20, 60.0)]);
        let result = estimate(
            &snap,
            Coordinate::new(91.0, 77.2),
            &InterpolatorConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InvalidCoordinate { .. })
        ));
    }
}
