//! Source attribution: decomposing the current AQI into categorical
//! contributions.
//!
//! Fixed category weights are modulated by pollutant ratios from the
//! estimate and by contextual signals (season, fire counts, weather) that
//! collaborators supply. Missing signals degrade confidence, never the
//! request.

use crate::models::{AqiEstimate, Contributions, SourceAttribution, SourceCategory};
use serde::{Deserialize, Serialize};

/// Base category weights before any modulation.
pub const BASE_TRAFFIC: f64 = 30.0;
pub const BASE_INDUSTRY: f64 = 25.0;
pub const BASE_STUBBLE_BURNING: f64 = 20.0;
pub const BASE_CONSTRUCTION: f64 = 25.0;

/// NO2 (ppb) above this points at heavy traffic.
pub const TRAFFIC_NO2_HIGH: f64 = 60.0;
/// NO2 below this argues against a traffic-dominated mix.
pub const TRAFFIC_NO2_LOW: f64 = 30.0;
/// CO (ppm) above this points at heavy traffic.
pub const TRAFFIC_CO_HIGH: f64 = 2.0;
/// A coarse PM10/PM2.5 ratio above this indicates dust (construction).
pub const CONSTRUCTION_PM_RATIO: f64 = 2.0;
/// Off-season floor for the stubble-burning share before normalization.
pub const STUBBLE_OFF_SEASON_FLOOR: f64 = 5.0;
/// Weekend reduction to the traffic share.
pub const WEEKEND_TRAFFIC_DISCOUNT: f64 = 5.0;

/// Crop-residue burning months (October through December).
pub const STUBBLE_SEASON_MONTHS: [u32; 3] = [10, 11, 12];

/// Contributions are reported at this granularity; the rounding remainder is
/// folded into the dominant category so the total reconciles exactly.
const PERCENT_GRANULARITY: f64 = 0.1;

/// Contextual signals from external collaborators. All optional; absent
/// signals fall back to category priors and lower the reported confidence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ContextSignals {
    /// Calendar month, 1-12.
    pub month: Option<u32>,
    /// Day of week, 1 = Monday .. 7 = Sunday. Weekends see lighter traffic.
    pub weekday: Option<u32>,
    /// Active farm-fire detections in the upwind region.
    pub fire_count: Option<u32>,
    pub wind_speed_mps: Option<f64>,
    pub temperature_c: Option<f64>,
}

/// Decompose the estimate's AQI into per-category percentages.
pub fn attribute(estimate: &AqiEstimate, signals: &ContextSignals) -> SourceAttribution {
    let readings = &estimate.pollutants;

    let mut traffic = BASE_TRAFFIC;
    let mut industry = BASE_INDUSTRY;
    let mut stubble = BASE_STUBBLE_BURNING;
    let mut construction = BASE_CONSTRUCTION;

    if readings.no2 > TRAFFIC_NO2_HIGH || readings.co > TRAFFIC_CO_HIGH {
        traffic += 15.0;
    } else if readings.no2 > 0.0 && readings.no2 < TRAFFIC_NO2_LOW {
        traffic -= 10.0;
    }

    if let Some(weekday) = signals.weekday {
        if weekday >= 6 {
            traffic -= WEEKEND_TRAFFIC_DISCOUNT;
        }
    }

    match signals.month {
        Some(month) if STUBBLE_SEASON_MONTHS.contains(&month) => {
            let fires = signals.fire_count.unwrap_or(0);
            if fires > 0 {
                stubble += (fires as f64 * 2.0).min(30.0);
            }
        }
        Some(_) => {
            stubble = (stubble - 15.0).max(STUBBLE_OFF_SEASON_FLOOR);
        }
        None => {}
    }

    if readings.pm25 > 0.0 && readings.pm10 / readings.pm25 > CONSTRUCTION_PM_RATIO {
        construction += 20.0;
    }

    if let (Some(temperature), Some(wind)) = (signals.temperature_c, signals.wind_speed_mps) {
        if temperature > 30.0 && wind < 3.0 {
            industry += 10.0;
        }
    }

    // Scores stay positive so normalization is always well defined.
    let mut scores = Contributions {
        traffic: traffic.max(1.0),
        industry: industry.max(1.0),
        stubble_burning: stubble.max(1.0),
        construction: construction.max(1.0),
    };
    normalize_to_100(&mut scores);

    SourceAttribution {
        dominant_source: dominant(&scores),
        confidence: confidence(signals),
        contributions: scores,
    }
}

/// Scale scores into percentages at 0.1 granularity summing to exactly
/// 100.0, assigning the rounding remainder to the dominant category.
fn normalize_to_100(scores: &mut Contributions) {
    let total = scores.total();
    let mut rounded_sum = 0.0;
    for category in SourceCategory::ALL {
        let share = scores.get(category) / total * 100.0;
        let rounded = (share / PERCENT_GRANULARITY).round() * PERCENT_GRANULARITY;
        scores.set(category, rounded);
        rounded_sum += rounded;
    }
    let remainder = 100.0 - rounded_sum;
    let leader = dominant(scores);
    // One more rounding pass keeps the stored value on the 0.1 grid.
    let adjusted = scores.get(leader) + remainder;
    scores.set(
        leader,
        (adjusted / PERCENT_GRANULARITY).round() * PERCENT_GRANULARITY,
    );
}

/// Highest percentage wins; ties resolve in the fixed priority order of
/// `SourceCategory::ALL` (traffic > industry > stubble_burning >
/// construction).
fn dominant(scores: &Contributions) -> SourceCategory {
    let mut best = SourceCategory::Traffic;
    let mut best_value = scores.get(best);
    for category in SourceCategory::ALL {
        let value = scores.get(category);
        if value > best_value {
            best = category;
            best_value = value;
        }
    }
    best
}

/// Confidence grows with the contextual signal that was actually available;
/// with nothing but the pollutant vector it sits at the prior-only floor.
fn confidence(signals: &ContextSignals) -> f64 {
    let mut confidence = 50.0;
    if signals.month.is_some() {
        confidence += 10.0;
    }
    if signals.fire_count.is_some() {
        confidence += 5.0;
    }
    if signals.temperature_c.is_some() {
        confidence += 5.0;
    }
    if let Some(wind) = signals.wind_speed_mps {
        // Stronger wind makes dispersion-based reasoning more reliable.
        confidence += (wind.max(0.0) * 2.0).min(15.0);
    }
    confidence.clamp(0.0, 85.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, EstimateSource, Pollutant, PollutantVector};

    fn estimate_with(readings: PollutantVector) -> AqiEstimate {
        AqiEstimate {
            aqi: crate::aqi::aqi_from_pollutants(&readings),
            location: Coordinate::new(28.61, 77.21),
            pollutants: readings,
            source: EstimateSource::Interpolated,
            degraded: false,
        }
    }

    fn readings(pm25: f64, pm10: f64, no2: f64, co: f64) -> PollutantVector {
        let mut vector = PollutantVector::default();
        vector.set(Pollutant::Pm25, pm25);
        vector.set(Pollutant::Pm10, pm10);
        vector.set(Pollutant::No2, no2);
        vector.set(Pollutant::Co, co);
        vector
    }

    fn sum_is_exactly_100(attribution: &SourceAttribution) {
        let total = attribution.contributions.total();
        assert!(
            (total - 100.0).abs() < 0.5,
            "contributions sum to {total}, expected 100"
        );
    }

    #[test]
    fn contributions_always_sum_to_100() {
        let scenarios = [
            (readings(85.0, 120.0, 45.0, 1.8), ContextSignals::default()),
            (
                readings(200.0, 450.0, 80.0, 2.5),
                ContextSignals {
                    month: Some(11),
                    weekday: Some(3),
                    fire_count: Some(40),
                    wind_speed_mps: Some(1.0),
                    temperature_c: Some(18.0),
                },
            ),
            (
                readings(30.0, 40.0, 10.0, 0.3),
                ContextSignals {
                    month: Some(7),
                    weekday: Some(7),
                    fire_count: None,
                    wind_speed_mps: Some(8.0),
                    temperature_c: Some(34.0),
                },
            ),
            (readings(0.0, 0.0, 0.0, 0.0), ContextSignals::default()),
        ];
        for (vector, signals) in scenarios {
            let attribution = attribute(&estimate_with(vector), &signals);
            sum_is_exactly_100(&attribution);
        }
    }

    #[test]
    fn high_no2_elevates_traffic() {
        let attribution = attribute(
            &estimate_with(readings(85.0, 100.0, 90.0, 2.5)),
            &ContextSignals::default(),
        );
        assert_eq!(attribution.dominant_source, SourceCategory::Traffic);
        assert!(attribution.contributions.traffic > 30.0);
    }

    #[test]
    fn fire_season_elevates_stubble_burning() {
        let attribution = attribute(
            &estimate_with(readings(180.0, 220.0, 25.0, 0.8)),
            &ContextSignals {
                month: Some(11),
                fire_count: Some(50),
                ..Default::default()
            },
        );
        assert_eq!(attribution.dominant_source, SourceCategory::StubbleBurning);
        sum_is_exactly_100(&attribution);
    }

    #[test]
    fn off_season_floors_stubble_share() {
        let attribution = attribute(
            &estimate_with(readings(80.0, 100.0, 40.0, 1.0)),
            &ContextSignals {
                month: Some(5),
                ..Default::default()
            },
        );
        assert!(attribution.contributions.stubble_burning < 10.0);
        sum_is_exactly_100(&attribution);
    }

    #[test]
    fn coarse_dust_ratio_elevates_construction() {
        let attribution = attribute(
            &estimate_with(readings(40.0, 120.0, 40.0, 1.0)),
            &ContextSignals::default(),
        );
        assert_eq!(attribution.dominant_source, SourceCategory::Construction);
    }

    #[test]
    fn weekend_lowers_the_traffic_share() {
        let vector = readings(85.0, 100.0, 45.0, 1.2);
        let weekday = attribute(
            &estimate_with(vector),
            &ContextSignals {
                weekday: Some(2),
                ..Default::default()
            },
        );
        let weekend = attribute(
            &estimate_with(vector),
            &ContextSignals {
                weekday: Some(7),
                ..Default::default()
            },
        );
        assert!(weekend.contributions.traffic < weekday.contributions.traffic);
    }

    #[test]
    fn tie_breaks_follow_priority_order() {
        let even = Contributions {
            traffic: 25.0,
            industry: 25.0,
            stubble_burning: 25.0,
            construction: 25.0,
        };
        assert_eq!(dominant(&even), SourceCategory::Traffic);
    }

    #[test]
    fn missing_signals_lower_confidence() {
        let full = ContextSignals {
            month: Some(11),
            weekday: Some(2),
            fire_count: Some(10),
            wind_speed_mps: Some(6.0),
            temperature_c: Some(28.0),
        };
        let bare = ContextSignals::default();
        let vector = readings(85.0, 120.0, 45.0, 1.8);
        let with_signals = attribute(&estimate_with(vector), &full);
        let without = attribute(&estimate_with(vector), &bare);
        assert!(with_signals.confidence > without.confidence);
        assert_eq!(without.confidence, 50.0);
        assert!(with_signals.confidence <= 85.0);
    }

    #[test]
    fn attribution_is_deterministic() {
        let vector = readings(85.0, 120.0, 45.0, 1.8);
        let signals = ContextSignals {
            month: Some(11),
            weekday: Some(4),
            fire_count: Some(5),
            wind_speed_mps: Some(4.0),
            temperature_c: Some(22.0),
        };
        let first = attribute(&estimate_with(vector), &signals);
        let second = attribute(&estimate_with(vector), &signals);
        assert_eq!(first.dominant_source, second.dominant_source);
        assert_eq!(first.contributions.total(), second.contributions.total());
    }
}
