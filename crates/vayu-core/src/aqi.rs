//! The AQI breakpoint table.
//!
//! Single source of truth for concentration -> sub-index, composite AQI and
//! AQI -> category. Every component that needs a category (estimates, routes,
//! advisories) goes through this module so thresholds cannot drift.

use crate::models::{Pollutant, PollutantVector};
use serde::{Deserialize, Serialize};

/// One row of a pollutant's breakpoint table: concentrations in
/// `[conc_lo, conc_hi]` map linearly onto `[index_lo, index_hi]`.
struct Breakpoint {
    conc_lo: f64,
    conc_hi: f64,
    index_lo: f64,
    index_hi: f64,
}

const fn bp(conc_lo: f64, conc_hi: f64, index_lo: f64, index_hi: f64) -> Breakpoint {
    Breakpoint {
        conc_lo,
        conc_hi,
        index_lo,
        index_hi,
    }
}

/// US EPA breakpoints. PM in ug/m3, NO2/SO2/O3 in ppb, CO in ppm.
const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 12.0, 0.0, 50.0),
    bp(12.1, 35.4, 51.0, 100.0),
    bp(35.5, 55.4, 101.0, 150.0),
    bp(55.5, 150.4, 151.0, 200.0),
    bp(150.5, 250.4, 201.0, 300.0),
    bp(250.5, 500.4, 301.0, 500.0),
];

const PM10_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 54.0, 0.0, 50.0),
    bp(55.0, 154.0, 51.0, 100.0),
    bp(155.0, 254.0, 101.0, 150.0),
    bp(255.0, 354.0, 151.0, 200.0),
    bp(355.0, 424.0, 201.0, 300.0),
    bp(425.0, 604.0, 301.0, 500.0),
];

const NO2_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 53.0, 0.0, 50.0),
    bp(54.0, 100.0, 51.0, 100.0),
    bp(101.0, 360.0, 101.0, 150.0),
    bp(361.0, 649.0, 151.0, 200.0),
    bp(650.0, 1249.0, 201.0, 300.0),
    bp(1250.0, 2049.0, 301.0, 500.0),
];

const SO2_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 35.0, 0.0, 50.0),
    bp(36.0, 75.0, 51.0, 100.0),
    bp(76.0, 185.0, 101.0, 150.0),
    bp(186.0, 304.0, 151.0, 200.0),
    bp(305.0, 604.0, 201.0, 300.0),
    bp(605.0, 1004.0, 301.0, 500.0),
];

const CO_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 4.4, 0.0, 50.0),
    bp(4.5, 9.4, 51.0, 100.0),
    bp(9.5, 12.4, 101.0, 150.0),
    bp(12.5, 15.4, 151.0, 200.0),
    bp(15.5, 30.4, 201.0, 300.0),
    bp(30.5, 50.4, 301.0, 500.0),
];

const O3_BREAKPOINTS: [Breakpoint; 6] = [
    bp(0.0, 54.0, 0.0, 50.0),
    bp(55.0, 70.0, 51.0, 100.0),
    bp(71.0, 85.0, 101.0, 150.0),
    bp(86.0, 105.0, 151.0, 200.0),
    bp(106.0, 200.0, 201.0, 300.0),
    bp(201.0, 504.0, 301.0, 500.0),
];

const AQI_CEILING: f64 = 500.0;

fn breakpoints(pollutant: Pollutant) -> &'static [Breakpoint] {
    match pollutant {
        Pollutant::Pm25 => &PM25_BREAKPOINTS,
        Pollutant::Pm10 => &PM10_BREAKPOINTS,
        Pollutant::No2 => &NO2_BREAKPOINTS,
        Pollutant::So2 => &SO2_BREAKPOINTS,
        Pollutant::Co => &CO_BREAKPOINTS,
        Pollutant::O3 => &O3_BREAKPOINTS,
    }
}

/// Sub-index for a single pollutant concentration.
///
/// Piecewise linear within each breakpoint row; concentrations above the top
/// row clamp to the AQI ceiling. Negative or non-finite input maps to 0.
pub fn sub_index(pollutant: Pollutant, concentration: f64) -> f64 {
    if !concentration.is_finite() || concentration <= 0.0 {
        return 0.0;
    }
    let table = breakpoints(pollutant);
    for row in table {
        if concentration <= row.conc_hi {
            let span = row.conc_hi - row.conc_lo;
            if span <= 0.0 {
                return row.index_lo;
            }
            let fraction = (concentration - row.conc_lo).max(0.0) / span;
            return row.index_lo + fraction * (row.index_hi - row.index_lo);
        }
    }
    AQI_CEILING
}

/// Composite AQI: the maximum sub-index over all pollutants.
pub fn aqi_from_pollutants(readings: &PollutantVector) -> f64 {
    Pollutant::ALL
        .iter()
        .map(|&pollutant| sub_index(pollutant, readings.get(pollutant)))
        .fold(0.0, f64::max)
}

/// AQI severity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi > 300.0 {
            AqiCategory::Hazardous
        } else if aqi > 200.0 {
            AqiCategory::VeryUnhealthy
        } else if aqi > 150.0 {
            AqiCategory::Unhealthy
        } else if aqi > 100.0 {
            AqiCategory::UnhealthySensitive
        } else if aqi > 50.0 {
            AqiCategory::Moderate
        } else {
            AqiCategory::Good
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

/// Health guidance for one AQI band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthAdvisory {
    pub aqi_level: &'static str,
    pub health_impact: &'static str,
    pub recommendations: Vec<&'static str>,
    pub vulnerable_groups: Vec<&'static str>,
    pub outdoor_activity: &'static str,
}

/// Advisory text per category, keyed off the same breakpoint table as every
/// other consumer.
pub fn health_advisory(category: AqiCategory) -> HealthAdvisory {
    match category {
        AqiCategory::Good => HealthAdvisory {
            aqi_level: category.label(),
            health_impact: "Air quality poses little or no risk.",
            recommendations: vec!["Enjoy normal outdoor activities."],
            vulnerable_groups: vec![],
            outdoor_activity: "unrestricted",
        },
        AqiCategory::Moderate => HealthAdvisory {
            aqi_level: category.label(),
            health_impact: "Acceptable air quality; unusually sensitive people may notice effects.",
            recommendations: vec!["Sensitive individuals should consider limiting prolonged exertion outdoors."],
            vulnerable_groups: vec!["people with respiratory conditions"],
            outdoor_activity: "normal",
        },
        AqiCategory::UnhealthySensitive => HealthAdvisory {
            aqi_level: category.label(),
            health_impact: "Members of sensitive groups may experience health effects.",
            recommendations: vec![
                "Sensitive groups should reduce prolonged outdoor exertion.",
                "Keep quick-relief medicine handy if asthmatic.",
            ],
            vulnerable_groups: vec!["children", "elderly", "people with lung or heart disease"],
            outdoor_activity: "reduce for sensitive groups",
        },
        AqiCategory::Unhealthy => HealthAdvisory {
            aqi_level: category.label(),
            health_impact: "Everyone may begin to experience health effects.",
            recommendations: vec![
                "Limit prolonged outdoor exertion.",
                "Wear an N95 mask when outdoors for extended periods.",
            ],
            vulnerable_groups: vec!["children", "elderly", "pregnant women", "people with lung or heart disease"],
            outdoor_activity: "limit",
        },
        AqiCategory::VeryUnhealthy => HealthAdvisory {
            aqi_level: category.label(),
            health_impact: "Health alert: everyone may experience more serious health effects.",
            recommendations: vec![
                "Avoid outdoor exertion.",
                "Run air purifiers indoors and keep windows closed.",
                "Wear an N95 mask if you must go outside.",
            ],
            vulnerable_groups: vec!["everyone, especially children and the elderly"],
            outdoor_activity: "avoid",
        },
        AqiCategory::Hazardous => HealthAdvisory {
            aqi_level: category.label(),
            health_impact: "Emergency conditions: the entire population is likely to be affected.",
            recommendations: vec![
                "Stay indoors with filtered air.",
                "Avoid all outdoor physical activity.",
                "Follow local emergency guidance.",
            ],
            vulnerable_groups: vec!["everyone"],
            outdoor_activity: "stay indoors",
        },
    }
}
