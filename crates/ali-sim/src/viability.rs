//! Culture viability rules.
//!
//! Verdicts are one-way: the engine only asks these rules about cultures that
//! are still alive, and never revives one.

use ali_core::{Band, Real};
use serde::{Deserialize, Serialize};

use crate::constants::ChamberConstants;
use crate::environment::Environment;

/// Why a culture was declared dead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FailureCause {
    /// Medium level left the interface band.
    Volume { volume: Real },
    /// Lethal temperature.
    Temperature { temperature: Real },
    /// Lethal pH.
    Ph { ph: Real },
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCause::Volume { volume } => write!(f, "medium level {volume:.3} mL"),
            FailureCause::Temperature { temperature } => {
                write!(f, "temperature {temperature:.1} °C")
            }
            FailureCause::Ph { ph } => write!(f, "pH {ph:.2}"),
        }
    }
}

/// Thresholds for both cultures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViabilityRules {
    /// Controlled culture survives within `target ± factor × tolerance`.
    pub controlled_volume_factor: Real,
    /// Uncontrolled culture survives within `target ± factor × tolerance`.
    pub uncontrolled_volume_factor: Real,
    /// Survivable temperature (°C), controlled culture.
    pub temperature: Band,
    /// Survivable pH, controlled culture.
    pub ph: Band,
}

impl Default for ViabilityRules {
    fn default() -> Self {
        Self {
            controlled_volume_factor: 3.0,
            uncontrolled_volume_factor: 2.0,
            temperature: Band::new(30.0, 42.0),
            ph: Band::new(6.5, 7.8),
        }
    }
}

impl ViabilityRules {
    fn volume_band(constants: &ChamberConstants, factor: Real) -> Band {
        Band::around(constants.target_volume, constants.tolerance_volume * factor)
    }

    /// First violated condition for the pump-controlled culture, if any.
    pub fn controlled_failure(
        &self,
        constants: &ChamberConstants,
        volume: Real,
        env: &Environment,
    ) -> Option<FailureCause> {
        if !Self::volume_band(constants, self.controlled_volume_factor).contains(volume) {
            return Some(FailureCause::Volume { volume });
        }
        if !self.temperature.contains(env.temperature) {
            return Some(FailureCause::Temperature {
                temperature: env.temperature,
            });
        }
        if !self.ph.contains(env.ph) {
            return Some(FailureCause::Ph { ph: env.ph });
        }
        None
    }

    /// Violated condition for the uncontrolled reference culture, if any.
    ///
    /// Only the medium level is checked, against a tighter band.
    pub fn uncontrolled_failure(
        &self,
        constants: &ChamberConstants,
        volume: Real,
    ) -> Option<FailureCause> {
        if Self::volume_band(constants, self.uncontrolled_volume_factor).contains(volume) {
            None
        } else {
            Some(FailureCause::Volume { volume })
        }
    }
}
