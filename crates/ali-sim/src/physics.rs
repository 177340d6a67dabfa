//! Medium loss terms and volume integration.
//!
//! `dV/dt = -k_evap - k_cons + Q_pump`, integrated with forward Euler over
//! the driver's step. Loss rates are in mL/h.

use ali_core::Real;
use serde::{Deserialize, Serialize};

use crate::constants::ChamberConstants;
use crate::environment::Environment;

/// Evaporation rate (mL/h).
///
/// Rises 5 % per °C above the setpoint and scales with the humidity deficit
/// relative to the setpoint, never dropping below half the base rate on the
/// humidity side. The temperature factor is not clamped.
pub fn evaporation_rate(constants: &ChamberConstants, env: &Environment) -> Real {
    let temp_factor = 1.0 + 0.05 * (env.temperature - constants.optimal_temperature);
    let humidity_factor =
        ((100.0 - env.humidity) / (100.0 - constants.optimal_humidity)).max(0.5);
    constants.base_evaporation_rate * temp_factor * humidity_factor
}

/// Cellular consumption rate (mL/h). Dead cells consume nothing.
pub fn consumption_rate(constants: &ChamberConstants, cells_alive: bool) -> Real {
    let viability_factor = if cells_alive { 1.0 } else { 0.0 };
    constants.base_cell_consumption_rate * constants.cell_count * viability_factor
}

/// Loss terms evaluated for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossRates {
    pub evaporation: Real,
    pub consumption: Real,
}

impl LossRates {
    pub fn evaluate(constants: &ChamberConstants, env: &Environment, cells_alive: bool) -> Self {
        Self {
            evaporation: evaporation_rate(constants, env),
            consumption: consumption_rate(constants, cells_alive),
        }
    }

    pub fn total(&self) -> Real {
        self.evaporation + self.consumption
    }
}

/// Forward Euler volume update, floored at an empty chamber.
pub fn integrate_volume(volume: Real, net_rate: Real, dt: Real) -> Real {
    (volume + net_rate * dt).max(0.0)
}
