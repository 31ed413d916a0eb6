//! Core data models for the air-quality engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 point, decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within global lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Rectangular service area. Queries outside it are rejected with
/// `InvalidCoordinate` rather than extrapolated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ServiceBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl ServiceBounds {
    pub fn contains(&self, point: Coordinate) -> bool {
        point.is_valid()
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

impl Default for ServiceBounds {
    /// Delhi NCR airshed.
    fn default() -> Self {
        Self {
            min_lat: 27.5,
            max_lat: 29.5,
            min_lng: 76.0,
            max_lng: 78.5,
        }
    }
}

/// The pollutants tracked by the monitoring network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];
}

/// Concentrations for every tracked pollutant. PM in ug/m3, NO2/SO2/O3 in
/// ppb, CO in ppm. Values are clamped non-negative on construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantVector {
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
}

impl PollutantVector {
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn set(&mut self, pollutant: Pollutant, value: f64) {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        match pollutant {
            Pollutant::Pm25 => self.pm25 = value,
            Pollutant::Pm10 => self.pm10 = value,
            Pollutant::No2 => self.no2 = value,
            Pollutant::So2 => self.so2 = value,
            Pollutant::Co => self.co = value,
            Pollutant::O3 => self.o3 = value,
        }
    }

}

/// Latest reading from one monitoring station. Owned by the station
/// snapshot; replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStation {
    pub id: String,
    pub name: String,
    pub location: Coordinate,
    pub readings: PollutantVector,
    pub recorded_at: DateTime<Utc>,
}

/// An immutable, fully-formed view of the station network at one instant.
/// The refresh path builds a new snapshot and publishes it atomically;
/// readers never observe a torn state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub stations: Vec<MonitoringStation>,
    pub taken_at: DateTime<Utc>,
}

impl StationSnapshot {
    pub fn new(mut stations: Vec<MonitoringStation>, taken_at: DateTime<Utc>) -> Self {
        // Stable order so every derived computation is deterministic.
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        Self { stations, taken_at }
    }

    pub fn empty(taken_at: DateTime<Utc>) -> Self {
        Self {
            stations: Vec::new(),
            taken_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Network-wide mean reading, used as the degraded fallback when a query
    /// point is beyond the search radius of every station.
    pub fn mean_readings(&self) -> Option<PollutantVector> {
        if self.stations.is_empty() {
            return None;
        }
        let n = self.stations.len() as f64;
        let mut mean = PollutantVector::default();
        for pollutant in Pollutant::ALL {
            let sum: f64 = self
                .stations
                .iter()
                .map(|station| station.readings.get(pollutant))
                .sum();
            mean.set(pollutant, sum / n);
        }
        Some(mean)
    }
}

/// Where an AQI estimate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "station_id")]
pub enum EstimateSource {
    /// Verbatim reading from a station the query point coincides with.
    Station(String),
    /// Inverse-distance weighted blend of nearby stations.
    Interpolated,
}

/// AQI and pollutant concentrations estimated at one coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqiEstimate {
    pub aqi: f64,
    pub location: Coordinate,
    pub pollutants: PollutantVector,
    pub source: EstimateSource,
    /// True when the estimate fell back to the network-wide mean because no
    /// station was inside the search radius.
    pub degraded: bool,
}

/// Forecast trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Projection 48 h and 72 h ahead. Built per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub aqi_48h: f64,
    pub aqi_72h: f64,
    pub trend: Trend,
    /// 0-100, non-increasing with forecast horizon.
    pub confidence: f64,
}

/// Pollution source categories, ordered by tie-break priority: when two
/// categories score the same percentage, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Traffic,
    Industry,
    StubbleBurning,
    Construction,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 4] = [
        SourceCategory::Traffic,
        SourceCategory::Industry,
        SourceCategory::StubbleBurning,
        SourceCategory::Construction,
    ];
}

/// Percentage contribution per source category. Percentages always sum to
/// exactly 100.0; the rounding remainder is folded into the dominant
/// category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Contributions {
    pub traffic: f64,
    pub industry: f64,
    pub stubble_burning: f64,
    pub construction: f64,
}

impl Contributions {
    pub fn get(&self, category: SourceCategory) -> f64 {
        match category {
            SourceCategory::Traffic => self.traffic,
            SourceCategory::Industry => self.industry,
            SourceCategory::StubbleBurning => self.stubble_burning,
            SourceCategory::Construction => self.construction,
        }
    }

    pub fn set(&mut self, category: SourceCategory, value: f64) {
        match category {
            SourceCategory::Traffic => self.traffic = value,
            SourceCategory::Industry => self.industry = value,
            SourceCategory::StubbleBurning => self.stubble_burning = value,
            SourceCategory::Construction => self.construction = value,
        }
    }

    pub fn total(&self) -> f64 {
        self.traffic + self.industry + self.stubble_burning + self.construction
    }
}

/// Decomposition of the current AQI into source contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub contributions: Contributions,
    pub dominant_source: SourceCategory,
    pub confidence: f64,
}

/// A pollution-aware route between two points. Built per request, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeRoute {
    /// Ordered coordinates along the path, start and end inclusive.
    pub waypoints: Vec<Coordinate>,
    pub distance_km: f64,
    /// Distance-weighted mean of the interpolated AQI along the path.
    pub avg_aqi: f64,
    pub quality: crate::aqi::AqiCategory,
}
