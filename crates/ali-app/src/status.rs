//! Presentation-neutral classification of readings.

use ali_core::Band;
use ali_sim::{Environment, RiskLevel};
use serde::Serialize;

/// Status of a reading relative to its nominal band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBand {
    /// Inside the nominal band.
    Ok,
    /// Outside, but within half the band width of it.
    Warning,
    Critical,
}

impl StatusBand {
    pub fn classify(value: f64, nominal: Band) -> Self {
        if nominal.contains(value) {
            StatusBand::Ok
        } else if nominal.widened(nominal.width() * 0.5).contains(value) {
            StatusBand::Warning
        } else {
            StatusBand::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBand::Ok => "OK",
            StatusBand::Warning => "Attention",
            StatusBand::Critical => "Critical",
        }
    }
}

/// Nominal operating bands used for status display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NominalBands {
    pub temperature: Band,
    pub co2: Band,
    pub ph: Band,
    pub humidity: Band,
}

impl Default for NominalBands {
    fn default() -> Self {
        Self {
            temperature: Band::new(36.0, 38.0),
            co2: Band::new(4.8, 5.2),
            ph: Band::new(7.2, 7.5),
            humidity: Band::new(85.0, 95.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentStatus {
    pub temperature: StatusBand,
    pub co2: StatusBand,
    pub ph: StatusBand,
    pub humidity: StatusBand,
}

impl EnvironmentStatus {
    pub fn evaluate(env: &Environment, bands: &NominalBands) -> Self {
        Self {
            temperature: StatusBand::classify(env.temperature, bands.temperature),
            co2: StatusBand::classify(env.co2, bands.co2),
            ph: StatusBand::classify(env.ph, bands.ph),
            humidity: StatusBand::classify(env.humidity, bands.humidity),
        }
    }

    /// Worst status across all readings.
    pub fn worst(&self) -> StatusBand {
        [self.temperature, self.co2, self.ph, self.humidity]
            .into_iter()
            .max_by_key(|s| match s {
                StatusBand::Ok => 0,
                StatusBand::Warning => 1,
                StatusBand::Critical => 2,
            })
            .unwrap_or(StatusBand::Ok)
    }
}

/// Simulated hours as `HH:MM:SS`.
pub fn format_sim_time(hours: f64) -> String {
    let total_seconds = (hours.max(0.0) * 3600.0).round() as u64;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

pub fn risk_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Low",
        RiskLevel::Medium => "Medium",
        RiskLevel::High => "High",
    }
}
