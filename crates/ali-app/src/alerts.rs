//! Threshold alerts raised against the engine state.
//!
//! Each alert fires once and stays latched until the monitor is reset, except
//! the pump alert, which re-arms after a fixed amount of simulated time.

use ali_sim::SimulationState;

use crate::event_log::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Humidity below this raises a warning (%).
    pub humidity_low: f64,
    /// Temperature below this raises a critical alert (°C).
    pub temperature_low: f64,
    pub ph_low: f64,
    /// Pump flow above this is reported as an active correction (mL/min).
    pub pump_high: f64,
    /// Simulated hours before the pump alert may fire again.
    pub pump_rearm_hours: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            humidity_low: 80.0,
            temperature_low: 35.0,
            ph_low: 7.0,
            pump_high: 0.05,
            pump_rearm_hours: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    HumidityLow { humidity: f64 },
    TemperatureLow { temperature: f64 },
    PhLow { ph: f64 },
    PumpHigh { flow: f64 },
    CultureFailed,
    ReferenceFailed { at_hours: f64 },
}

impl Alert {
    pub fn level(&self) -> LogLevel {
        match self {
            Alert::HumidityLow { .. } | Alert::PhLow { .. } | Alert::ReferenceFailed { .. } => {
                LogLevel::Warning
            }
            Alert::TemperatureLow { .. } | Alert::CultureFailed => LogLevel::Danger,
            Alert::PumpHigh { .. } => LogLevel::Info,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Alert::HumidityLow { humidity } => format!("Low humidity detected ({humidity:.1} %)"),
            Alert::TemperatureLow { temperature } => {
                format!("Temperature critically low ({temperature:.1} °C)")
            }
            Alert::PhLow { ph } => format!("pH falling ({ph:.2}), possible contamination"),
            Alert::PumpHigh { flow } => format!(
                "Automatic ALI level correction in progress ({:.1} µL/min)",
                flow * 1000.0
            ),
            Alert::CultureFailed => "Controlled culture lost".to_string(),
            Alert::ReferenceFailed { at_hours } => {
                format!("Uncontrolled culture failed at {at_hours:.1} h (ALI lost)")
            }
        }
    }
}

/// Per-session alert latches.
#[derive(Debug, Clone, Default)]
pub struct AlertMonitor {
    thresholds: AlertThresholds,
    humidity_shown: bool,
    temperature_shown: bool,
    ph_shown: bool,
    culture_shown: bool,
    reference_shown: bool,
    /// Simulated time at which the pump alert may fire again.
    pump_rearm_at: Option<f64>,
}

impl AlertMonitor {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }

    /// Alerts newly raised by `state`, in a fixed order.
    pub fn evaluate(&mut self, state: &SimulationState) -> Vec<Alert> {
        let t = &self.thresholds;
        let env = &state.environment;
        let mut raised = Vec::new();

        if !state.culture_alive_without_control && !self.reference_shown {
            if let Some(at_hours) = state.failure_time_without_control {
                raised.push(Alert::ReferenceFailed { at_hours });
                self.reference_shown = true;
            }
        }
        if !state.culture_alive && !self.culture_shown {
            raised.push(Alert::CultureFailed);
            self.culture_shown = true;
        }
        if env.humidity < t.humidity_low && !self.humidity_shown {
            raised.push(Alert::HumidityLow {
                humidity: env.humidity,
            });
            self.humidity_shown = true;
        }
        if env.temperature < t.temperature_low && !self.temperature_shown {
            raised.push(Alert::TemperatureLow {
                temperature: env.temperature,
            });
            self.temperature_shown = true;
        }
        if env.ph < t.ph_low && !self.ph_shown {
            raised.push(Alert::PhLow { ph: env.ph });
            self.ph_shown = true;
        }

        let pump_armed = self.pump_rearm_at.is_none_or(|at| state.time >= at);
        if state.pump_flow > t.pump_high && pump_armed {
            raised.push(Alert::PumpHigh {
                flow: state.pump_flow,
            });
            self.pump_rearm_at = Some(state.time + t.pump_rearm_hours);
        }

        raised
    }
}
