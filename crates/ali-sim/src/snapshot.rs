//! Read-only view handed to renderers.

use ali_core::Real;
use serde::Serialize;

use crate::engine::SimulationState;
use crate::prediction::Prediction;

/// Owned copy of the engine state plus derived values.
///
/// Mutating a snapshot has no effect on the engine that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    #[serde(flatten)]
    pub state: SimulationState,
    pub prediction: Prediction,
    /// `volume - target_volume`, rounded to 0.001 mL.
    pub level_deviation: Real,
    pub target_volume: Real,
    pub tolerance_volume: Real,
}

/// Round to three decimals, the display precision of level deviation.
pub fn round_millis(v: Real) -> Real {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_thousandths() {
        assert_eq!(round_millis(-0.03649), -0.036);
        assert_eq!(round_millis(0.0126), 0.013);
        assert_eq!(round_millis(0.0), 0.0);
    }
}
