//! Heuristic viability outlook.
//!
//! This is a weighted deviation score, not a projection of the model forward
//! in time. The horizon is carried along for display only.

use std::fmt;

use ali_core::Real;
use serde::{Deserialize, Serialize};

use crate::constants::ChamberConstants;
use crate::environment::{Environment, Scenario};

/// Horizon reported with the default prediction (h).
pub const DEFAULT_HORIZON_HOURS: Real = 72.0;

/// Coarse risk classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: Real) -> Self {
        if score < 5.0 {
            RiskLevel::Low
        } else if score < 15.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Estimated time until the medium level reaches the lower tolerance edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NextAdjustment {
    /// Nothing is draining the chamber.
    NotApplicable,
    /// Less than half an hour away, or already past.
    Imminent,
    InMinutes(u32),
    InHours(Real),
}

impl NextAdjustment {
    /// Classify the time to the lower edge of the tolerance band.
    pub fn estimate(constants: &ChamberConstants, volume: Real, total_loss_rate: Real) -> Self {
        if total_loss_rate <= 0.0 {
            return NextAdjustment::NotApplicable;
        }
        let margin = volume - (constants.target_volume - constants.tolerance_volume);
        let hours = margin / total_loss_rate;
        if hours < 0.5 {
            NextAdjustment::Imminent
        } else if hours < 1.0 {
            NextAdjustment::InMinutes((hours * 60.0).round() as u32)
        } else {
            NextAdjustment::InHours(hours)
        }
    }
}

impl fmt::Display for NextAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextAdjustment::NotApplicable => f.write_str("N/A"),
            NextAdjustment::Imminent => f.write_str("imminent"),
            NextAdjustment::InMinutes(min) => write!(f, "in {min} min"),
            NextAdjustment::InHours(h) => write!(f, "in {h:.1} h"),
        }
    }
}

/// Outlook returned to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub hours_ahead: Real,
    /// Percent, in `[0, 100]`.
    pub viability: Real,
    pub risk_score: Real,
    pub risk_level: RiskLevel,
    pub next_adjustment: NextAdjustment,
}

/// Weighted sum of deviations from the setpoints.
pub fn risk_score(
    constants: &ChamberConstants,
    env: &Environment,
    volume: Real,
    scenario: Scenario,
) -> Real {
    let mut score = 50.0 * (volume - constants.target_volume).abs();
    score += 2.0 * (env.temperature - constants.optimal_temperature).abs();
    score += 20.0 * (env.ph - constants.optimal_ph).abs();
    score += 0.5 * (85.0 - env.humidity).max(0.0);
    if scenario != Scenario::Normal {
        score += 10.0;
    }
    score
}

/// Score the current state and package it with the next-adjustment estimate.
pub fn predict(
    constants: &ChamberConstants,
    env: &Environment,
    volume: Real,
    scenario: Scenario,
    total_loss_rate: Real,
    hours_ahead: Real,
) -> Prediction {
    let score = risk_score(constants, env, volume, scenario);
    Prediction {
        hours_ahead,
        viability: (100.0 - score).clamp(0.0, 100.0),
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        next_adjustment: NextAdjustment::estimate(constants, volume, total_loss_rate),
    }
}
