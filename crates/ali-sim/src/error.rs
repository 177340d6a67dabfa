//! Error types for simulation operations.
//!
//! Stepping never fails; these errors come from construction and from
//! parsing command arguments supplied as text.

use thiserror::Error;

/// Errors encountered while configuring or commanding the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid constant {what}: {value}")]
    InvalidConstant { what: &'static str, value: f64 },

    #[error("Unknown scenario: {name}")]
    UnknownScenario { name: String },

    #[error("Unknown incident: {name}")]
    UnknownIncident { name: String },

    #[error("Controller error: {0}")]
    Control(#[from] ali_controls::ControlError),

    #[error("Numeric error: {0}")]
    Core(#[from] ali_core::CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
