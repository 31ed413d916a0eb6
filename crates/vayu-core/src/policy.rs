//! Policy intervention impact estimates.
//!
//! A fixed table of the levers the city pulls during bad-air episodes, with
//! the AQI reduction each delivers at full intensity and how long it takes
//! to show up in the readings.

use serde::{Deserialize, Serialize};

use crate::models::SourceCategory;

/// Interventions with a modellable effect on the airshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    OddEven,
    ConstructionHalt,
    FirecrackerBan,
    StubbleControl,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::OddEven,
        PolicyKind::ConstructionHalt,
        PolicyKind::FirecrackerBan,
        PolicyKind::StubbleControl,
    ];
}

struct PolicyProfile {
    /// AQI points removed at intensity 1.0.
    full_reduction: f64,
    /// Days until the effect shows up in the readings.
    timeline_days: u32,
    affected_sources: &'static [SourceCategory],
    description: &'static str,
}

const POLICY_PROFILES: [PolicyProfile; 4] = [
    PolicyProfile {
        full_reduction: 15.0,
        timeline_days: 7,
        affected_sources: &[SourceCategory::Traffic],
        description: "Odd-even vehicle rationing cuts traffic emissions for as long as the scheme runs.",
    },
    PolicyProfile {
        full_reduction: 20.0,
        timeline_days: 3,
        affected_sources: &[SourceCategory::Construction],
        description: "Halting construction work takes the dust load out almost immediately.",
    },
    PolicyProfile {
        full_reduction: 25.0,
        timeline_days: 2,
        affected_sources: &[SourceCategory::Traffic, SourceCategory::Industry],
        description: "A firecracker ban over the festival window prevents severe short-lived spikes.",
    },
    PolicyProfile {
        full_reduction: 30.0,
        timeline_days: 14,
        affected_sources: &[SourceCategory::StubbleBurning],
        description: "Incentivizing farmers away from residue burning pays off over the full season.",
    },
];

fn profile(policy: PolicyKind) -> &'static PolicyProfile {
    match policy {
        PolicyKind::OddEven => &POLICY_PROFILES[0],
        PolicyKind::ConstructionHalt => &POLICY_PROFILES[1],
        PolicyKind::FirecrackerBan => &POLICY_PROFILES[2],
        PolicyKind::StubbleControl => &POLICY_PROFILES[3],
    }
}

/// Estimated effect of applying a policy at a given intensity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyImpact {
    pub policy: PolicyKind,
    /// AQI points the intervention is expected to shave off, one decimal.
    pub estimated_reduction: f64,
    pub timeline_days: u32,
    pub affected_sources: Vec<SourceCategory>,
    pub description: &'static str,
}

/// Estimate the impact of `policy` applied at `intensity` (0.0 to 1.0;
/// out-of-range or non-finite values clamp rather than failing).
pub fn impact(policy: PolicyKind, intensity: f64) -> PolicyImpact {
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let profile = profile(policy);
    let reduction = profile.full_reduction * intensity;

    PolicyImpact {
        policy,
        estimated_reduction: (reduction * 10.0).round() / 10.0,
        timeline_days: profile.timeline_days,
        affected_sources: profile.affected_sources.to_vec(),
        description: profile.description,
    }
}
