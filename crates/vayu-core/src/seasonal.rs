//! Seasonal outlook for the Delhi NCR airshed.
//!
//! A fixed monthly pattern table: winter inversion plus crop-residue burning
//! makes October through January the high-risk window, while the monsoon
//! months wash the air out.

use serde::{Deserialize, Serialize};

/// Typical conditions for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPattern {
    pub month: u32,
    pub name: &'static str,
    /// Typical AQI band observed historically.
    pub typical_aqi_low: u32,
    pub typical_aqi_high: u32,
    pub high_risk: bool,
    pub summary: &'static str,
}

const MONTHLY_PATTERNS: [MonthlyPattern; 12] = [
    MonthlyPattern { month: 1, name: "January", typical_aqi_low: 180, typical_aqi_high: 320, high_risk: true, summary: "Winter inversion traps pollutants near the ground; frequent severe episodes." },
    MonthlyPattern { month: 2, name: "February", typical_aqi_low: 140, typical_aqi_high: 250, high_risk: false, summary: "Inversion weakens late in the month; air slowly improves." },
    MonthlyPattern { month: 3, name: "March", typical_aqi_low: 110, typical_aqi_high: 200, high_risk: false, summary: "Rising temperatures improve dispersion; dust begins to pick up." },
    MonthlyPattern { month: 4, name: "April", typical_aqi_low: 100, typical_aqi_high: 190, high_risk: false, summary: "Pre-monsoon dust storms drive coarse particulate spikes." },
    MonthlyPattern { month: 5, name: "May", typical_aqi_low: 110, typical_aqi_high: 210, high_risk: false, summary: "Hot, dusty conditions; ozone builds on still afternoons." },
    MonthlyPattern { month: 6, name: "June", typical_aqi_low: 90, typical_aqi_high: 180, high_risk: false, summary: "Monsoon onset begins to scrub particulates." },
    MonthlyPattern { month: 7, name: "July", typical_aqi_low: 60, typical_aqi_high: 120, high_risk: false, summary: "Monsoon rains; the cleanest stretch of the year." },
    MonthlyPattern { month: 8, name: "August", typical_aqi_low: 55, typical_aqi_high: 110, high_risk: false, summary: "Continued rains keep levels moderate." },
    MonthlyPattern { month: 9, name: "September", typical_aqi_low: 70, typical_aqi_high: 140, high_risk: false, summary: "Monsoon withdrawal; levels start creeping up." },
    MonthlyPattern { month: 10, name: "October", typical_aqi_low: 150, typical_aqi_high: 300, high_risk: true, summary: "Stubble burning begins upwind; sharp deterioration through the month." },
    MonthlyPattern { month: 11, name: "November", typical_aqi_low: 220, typical_aqi_high: 420, high_risk: true, summary: "Peak stubble burning meets falling temperatures; worst month of the year." },
    MonthlyPattern { month: 12, name: "December", typical_aqi_low: 200, typical_aqi_high: 360, high_risk: true, summary: "Cold, calm air holds pollution close to the surface." },
];

/// Seasonal summary served to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalOutlook {
    pub current_month: u32,
    pub current_month_name: &'static str,
    pub monthly_patterns: Vec<MonthlyPattern>,
    pub high_risk_season: bool,
    pub high_risk_months: Vec<&'static str>,
    pub low_risk_months: Vec<&'static str>,
    pub current_outlook: &'static str,
}

/// Build the outlook for a calendar month (1-12). Out-of-range months clamp
/// into the valid range rather than failing.
pub fn outlook(month: u32) -> SeasonalOutlook {
    let month = month.clamp(1, 12);
    let current = &MONTHLY_PATTERNS[(month - 1) as usize];
    let high_risk_months: Vec<&'static str> = MONTHLY_PATTERNS
        .iter()
        .filter(|pattern| pattern.high_risk)
        .map(|pattern| pattern.name)
        .collect();
    // The monsoon window is the reliable low: typical highs under 150.
    let low_risk_months: Vec<&'static str> = MONTHLY_PATTERNS
        .iter()
        .filter(|pattern| pattern.typical_aqi_high <= 140)
        .map(|pattern| pattern.name)
        .collect();

    SeasonalOutlook {
        current_month: month,
        current_month_name: current.name,
        monthly_patterns: MONTHLY_PATTERNS.to_vec(),
        high_risk_season: current.high_risk,
        high_risk_months,
        low_risk_months,
        current_outlook: current.summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn november_is_high_risk() {
        let outlook = outlook(11);
        assert!(outlook.high_risk_season);
        assert_eq!(outlook.current_month_name, "November");
        assert!(outlook.high_risk_months.contains(&"November"));
    }

    #[test]
    fn monsoon_months_are_low_risk() {
        let outlook = outlook(7);
        assert!(!outlook.high_risk_season);
        assert!(outlook.low_risk_months.contains(&"July"));
        assert!(outlook.low_risk_months.contains(&"August"));
    }

    #[test]
    fn out_of_range_month_clamps() {
        assert_eq!(outlook(0).current_month, 1);
        assert_eq!(outlook(13).current_month, 12);
    }

    #[test]
    fn table_covers_all_twelve_months() {
        let outlook = outlook(1);
        assert_eq!(outlook.monthly_patterns.len(), 12);
        for (idx, pattern) in outlook.monthly_patterns.iter().enumerate() {
            assert_eq!(pattern.month as usize, idx + 1);
            assert!(pattern.typical_aqi_low < pattern.typical_aqi_high);
        }
    }
}
