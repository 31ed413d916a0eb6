//! AQI trend forecasting.
//!
//! Fits a recency-weighted linear trend to a short historical window of
//! AQI samples at (or near) the query location and projects it 48 h and
//! 72 h ahead. Always answers: an empty window yields a flat forecast at
//! minimum confidence rather than an error.

use crate::error::EngineError;
use crate::interpolate::{self, InterpolatorConfig};
use crate::models::{AqiEstimate, Coordinate, ForecastResult, StationSnapshot, Trend};
use serde::{Deserialize, Serialize};

/// Relative change in AQI beyond which the trend is no longer "stable".
pub const TREND_DELTA_THRESHOLD: f64 = 0.05;
/// Confidence of a forecast at horizon zero with a perfectly quiet window.
pub const BASE_CONFIDENCE: f64 = 90.0;
/// Confidence floor, reported when there is no history to fit.
pub const MIN_CONFIDENCE: f64 = 20.0;
/// Confidence lost per hour of forecast horizon.
pub const HORIZON_PENALTY_PER_HOUR: f64 = 0.25;
/// Confidence lost per unit of relative window variance (std/mean).
pub const VARIANCE_PENALTY_SCALE: f64 = 60.0;

pub const FORECAST_48H: f64 = 48.0;
pub const FORECAST_72H: f64 = 72.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Samples older than this are dropped from the fit.
    pub max_window_hours: f64,
    /// Half-life of the recency weighting applied to samples.
    pub recency_half_life_hours: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            max_window_hours: 72.0,
            recency_half_life_hours: 24.0,
        }
    }
}

/// One historical AQI observation at the query location.
/// `age_hours` is 0 for "now" and grows into the past.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AqiSample {
    pub age_hours: f64,
    pub aqi: f64,
}

/// Interpolate each historical snapshot at `location` to build the sample
/// window for the fit, most recent last. Snapshots the interpolator cannot
/// serve (e.g. momentarily empty) are skipped rather than failing the
/// forecast.
pub fn build_samples(
    history: &[&StationSnapshot],
    location: Coordinate,
    config: &InterpolatorConfig,
) -> Vec<AqiSample> {
    let Some(latest) = history.last() else {
        return Vec::new();
    };
    history
        .iter()
        .filter_map(|snapshot| {
            let estimate = interpolate::estimate(snapshot, location, config).ok()?;
            let age_hours =
                (latest.taken_at - snapshot.taken_at).num_seconds().max(0) as f64 / 3600.0;
            Some(AqiSample {
                age_hours,
                aqi: estimate.aqi,
            })
        })
        .collect()
}

/// Forecast from the current estimate plus a window of historical samples.
pub fn forecast(
    current: &AqiEstimate,
    samples: &[AqiSample],
    config: &ForecastConfig,
) -> ForecastResult {
    let window: Vec<AqiSample> = samples
        .iter()
        .copied()
        .filter(|sample| {
            sample.aqi.is_finite()
                && sample.age_hours.is_finite()
                && sample.age_hours >= 0.0
                && sample.age_hours <= config.max_window_hours
        })
        .collect();

    if window.len() < 2 {
        // New or unreachable location: flat forecast, never a failure.
        return ForecastResult {
            aqi_48h: current.aqi,
            aqi_72h: current.aqi,
            trend: Trend::Stable,
            confidence: MIN_CONFIDENCE,
        };
    }

    let slope = weighted_slope_per_hour(&window, config);
    let aqi_48h = (current.aqi + slope * FORECAST_48H).max(0.0);
    let aqi_72h = (current.aqi + slope * FORECAST_72H).max(0.0);

    let trend = classify_trend(current.aqi, aqi_72h);
    let variance_ratio = relative_std(&window);
    // Report the weaker (72 h) confidence; the per-horizon value is
    // non-increasing in the horizon by construction.
    let confidence = confidence_at_horizon(FORECAST_72H, variance_ratio);

    ForecastResult {
        aqi_48h,
        aqi_72h,
        trend,
        confidence,
    }
}

/// Trend classification against the named threshold. A zero current AQI is
/// treated as stable to avoid dividing by zero.
pub fn classify_trend(current_aqi: f64, aqi_72h: f64) -> Trend {
    if current_aqi <= 0.0 {
        return Trend::Stable;
    }
    let delta = (aqi_72h - current_aqi) / current_aqi;
    if delta > TREND_DELTA_THRESHOLD {
        Trend::Increasing
    } else if delta < -TREND_DELTA_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Confidence at a given horizon for a window with the given relative
/// standard deviation. Monotonically non-increasing in both arguments,
/// clamped to [MIN_CONFIDENCE, 100].
pub fn confidence_at_horizon(horizon_hours: f64, variance_ratio: f64) -> f64 {
    let penalty =
        horizon_hours.max(0.0) * HORIZON_PENALTY_PER_HOUR + variance_ratio.max(0.0) * VARIANCE_PENALTY_SCALE;
    (BASE_CONFIDENCE - penalty).clamp(MIN_CONFIDENCE, 100.0)
}

/// Recency-weighted least-squares slope of AQI vs time (AQI units per hour).
/// Time runs negative into the past so a positive slope means worsening air.
fn weighted_slope_per_hour(window: &[AqiSample], config: &ForecastConfig) -> f64 {
    let half_life = config.recency_half_life_hours.max(1.0);
    let mut w_sum = 0.0;
    let mut t_mean = 0.0;
    let mut y_mean = 0.0;
    let weights: Vec<(f64, f64, f64)> = window
        .iter()
        .map(|sample| {
            let weight = 0.5f64.powf(sample.age_hours / half_life);
            (weight, -sample.age_hours, sample.aqi)
        })
        .collect();
    for &(weight, t, y) in &weights {
        w_sum += weight;
        t_mean += weight * t;
        y_mean += weight * y;
    }
    t_mean /= w_sum;
    y_mean /= w_sum;

    let mut covariance = 0.0;
    let mut t_variance = 0.0;
    for &(weight, t, y) in &weights {
        covariance += weight * (t - t_mean) * (y - y_mean);
        t_variance += weight * (t - t_mean) * (t - t_mean);
    }
    if t_variance <= f64::EPSILON {
        return 0.0;
    }
    covariance / t_variance
}

/// Standard deviation of the window relative to its mean (0 for a flat or
/// near-zero window).
fn relative_std(window: &[AqiSample]) -> f64 {
    let n = window.len() as f64;
    let mean: f64 = window.iter().map(|sample| sample.aqi).sum::<f64>() / n;
    if mean <= f64::EPSILON {
        return 0.0;
    }
    let variance: f64 = window
        .iter()
        .map(|sample| (sample.aqi - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt() / mean
}

/// Forecast straight from a snapshot history, interpolating at `location`.
pub fn forecast_at(
    history: &[&StationSnapshot],
    location: Coordinate,
    interp_config: &InterpolatorConfig,
    config: &ForecastConfig,
) -> Result<ForecastResult, EngineError> {
    let Some(latest) = history.last() else {
        return Err(EngineError::NoStationsAvailable);
    };
    let current = interpolate::estimate(latest, location, interp_config)?;
    let samples = build_samples(history, location, interp_config);
    Ok(forecast(&current, &samples, config))
}
