//! Physical constants of the chamber and controller gains.
//!
//! Both are fixed for the lifetime of an engine. Units follow the bench
//! conventions: volumes in mL, loss rates in mL/h, pump flow in mL/min.

use ali_controls::PIController;
use ali_core::Real;
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::{SimError, SimResult};

/// Chamber constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChamberConstants {
    /// Medium volume that keeps the tissue at the air-liquid interface (mL).
    pub target_volume: Real,
    /// Acceptable deviation either side of the target (mL).
    pub tolerance_volume: Real,
    /// Evaporation at optimal temperature and humidity (mL/h).
    pub base_evaporation_rate: Real,
    /// Medium uptake per million cells (mL/h).
    pub base_cell_consumption_rate: Real,
    /// Incubator setpoint (°C).
    pub optimal_temperature: Real,
    /// CO2 setpoint (%).
    pub optimal_co2: Real,
    /// Relative humidity setpoint (%). Must stay below 100.
    pub optimal_humidity: Real,
    pub optimal_ph: Real,
    /// Cell count (millions).
    pub cell_count: Real,
    /// Pump capacity (mL/min).
    pub max_pump_flow: Real,
}

impl Default for ChamberConstants {
    fn default() -> Self {
        Self {
            target_volume: 1.5,
            tolerance_volume: 0.1,
            // 0.5-1 mL/day
            base_evaporation_rate: 0.03,
            // 0.1-0.2 mL/day
            base_cell_consumption_rate: 0.006,
            optimal_temperature: 37.0,
            optimal_co2: 5.0,
            optimal_humidity: 95.0,
            optimal_ph: 7.35,
            cell_count: 1.0,
            max_pump_flow: 0.1,
        }
    }
}

impl ChamberConstants {
    /// Check that every constant is finite and physically meaningful.
    pub fn validate(&self) -> SimResult<()> {
        let fields: [(&'static str, Real); 10] = [
            ("target_volume", self.target_volume),
            ("tolerance_volume", self.tolerance_volume),
            ("base_evaporation_rate", self.base_evaporation_rate),
            ("base_cell_consumption_rate", self.base_cell_consumption_rate),
            ("optimal_temperature", self.optimal_temperature),
            ("optimal_co2", self.optimal_co2),
            ("optimal_humidity", self.optimal_humidity),
            ("optimal_ph", self.optimal_ph),
            ("cell_count", self.cell_count),
            ("max_pump_flow", self.max_pump_flow),
        ];
        for (what, value) in fields {
            ali_core::ensure_finite(value, what)?;
        }

        let positive = [
            ("target_volume", self.target_volume),
            ("tolerance_volume", self.tolerance_volume),
            ("max_pump_flow", self.max_pump_flow),
        ];
        for (what, value) in positive {
            if value <= 0.0 {
                return Err(SimError::InvalidConstant { what, value });
            }
        }

        let non_negative = [
            ("base_evaporation_rate", self.base_evaporation_rate),
            ("base_cell_consumption_rate", self.base_cell_consumption_rate),
            ("cell_count", self.cell_count),
        ];
        for (what, value) in non_negative {
            if value < 0.0 {
                return Err(SimError::InvalidConstant { what, value });
            }
        }

        // The humidity factor divides by (100 - optimal_humidity)
        if self.optimal_humidity >= 100.0 || self.optimal_humidity < 0.0 {
            return Err(SimError::InvalidConstant {
                what: "optimal_humidity",
                value: self.optimal_humidity,
            });
        }
        Ok(())
    }

    /// Environment at the incubator setpoints.
    pub fn optimal_environment(&self) -> Environment {
        Environment {
            temperature: self.optimal_temperature,
            co2: self.optimal_co2,
            humidity: self.optimal_humidity,
            ph: self.optimal_ph,
        }
    }
}

/// Gains and limits for the pump PI controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerGains {
    pub kp: Real,
    pub ki: Real,
    /// Symmetric clamp on the integral accumulator (mL·h).
    pub integral_limit: Real,
    /// Tracking error below which the pump is held off (mL).
    pub deadband: Real,
}

impl Default for ControllerGains {
    fn default() -> Self {
        Self {
            kp: 0.5,
            ki: 0.1,
            integral_limit: 1.0,
            deadband: 0.01,
        }
    }
}

impl ControllerGains {
    /// Build the pump controller, with output in `[0, max_pump_flow]` mL/min.
    pub fn build(&self, max_pump_flow: Real) -> SimResult<PIController> {
        let controller = PIController::new(self.kp, self.ki, 0.0, max_pump_flow)?
            .with_integral_limit(self.integral_limit)?
            .with_deadband(self.deadband)?;
        Ok(controller)
    }
}
