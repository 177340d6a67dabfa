//! PI controller used to drive the medium pump.
//!
//! `out = kp * e + ki * ∫e dt`, with:
//! - Integral clamping (anti-windup)
//! - Output clamping to the actuator range
//! - An optional dead-band that forces the minimum output near the setpoint

use ali_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// PI controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIController {
    /// Proportional gain.
    pub kp: Real,
    /// Integral gain, applied directly to the accumulated error.
    pub ki: Real,
    /// Minimum output value.
    pub out_min: Real,
    /// Maximum output value.
    pub out_max: Real,
    /// Symmetric limit on the integral accumulator. If None, the integral is unbounded.
    pub integral_limit: Option<Real>,
    /// When `|error|` is below this value the output is forced to `out_min`.
    pub deadband: Option<Real>,
}

impl PIController {
    /// Create a new PI controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain
    /// * `out_min` - Minimum output
    /// * `out_max` - Maximum output
    pub fn new(kp: Real, ki: Real, out_min: Real, out_max: Real) -> ControlResult<Self> {
        if !kp.is_finite() || !ki.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "gains must be finite",
            });
        }
        if !out_min.is_finite() || !out_max.is_finite() || out_min >= out_max {
            return Err(ControlError::InvalidArg {
                what: "out_min must be less than out_max",
            });
        }
        Ok(Self {
            kp,
            ki,
            out_min,
            out_max,
            integral_limit: None,
            deadband: None,
        })
    }

    /// Set integral windup limit.
    pub fn with_integral_limit(mut self, limit: Real) -> ControlResult<Self> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "integral_limit must be finite and non-negative",
            });
        }
        self.integral_limit = Some(limit);
        Ok(self)
    }

    /// Set the dead-band around the setpoint.
    pub fn with_deadband(mut self, deadband: Real) -> ControlResult<Self> {
        if !deadband.is_finite() || deadband < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "deadband must be finite and non-negative",
            });
        }
        self.deadband = Some(deadband);
        Ok(self)
    }

    /// Compute controller output given process variable and setpoint.
    ///
    /// # Arguments
    ///
    /// * `state` - Controller state (integral and last error)
    /// * `pv` - Process variable (measured value)
    /// * `sp` - Setpoint (desired value)
    /// * `dt` - Time since last update
    ///
    /// # Returns
    ///
    /// Updated state and output value.
    pub fn update(
        &self,
        state: &PIControllerState,
        pv: Real,
        sp: Real,
        dt: Real,
    ) -> (PIControllerState, Real) {
        // Positive error means PV is below setpoint
        let error = sp - pv;

        let raw_integral = state.integral + error * dt;
        let integral = match self.integral_limit {
            Some(limit) => raw_integral.clamp(-limit, limit),
            None => raw_integral,
        };

        let output_raw = self.kp * error + self.ki * integral;
        let mut output = output_raw.clamp(self.out_min, self.out_max);

        if let Some(deadband) = self.deadband {
            if error.abs() < deadband {
                output = self.out_min;
            }
        }

        let new_state = PIControllerState {
            integral,
            last_error: error,
        };

        (new_state, output)
    }
}

/// PI controller state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PIControllerState {
    /// Integral accumulator.
    pub integral: Real,
    /// Error computed on the most recent update.
    pub last_error: Real,
}
