//! Closed-loop medium level simulation for an air-liquid interface culture chamber.
//!
//! Provides:
//! - Chamber constants and PI controller gains
//! - Environment model with an explicit scenario/incident rule resolver
//! - Evaporation and cellular consumption rates
//! - One-way viability evaluation for a controlled and an uncontrolled culture
//! - Bounded history of samples for charting
//! - Heuristic viability prediction
//! - The `SimulationEngine` that ties them together, stepped by an external driver

pub mod constants;
pub mod engine;
pub mod environment;
pub mod error;
pub mod history;
pub mod noise;
pub mod physics;
pub mod prediction;
pub mod snapshot;
pub mod viability;

// Re-exports for public API
pub use constants::{ChamberConstants, ControllerGains};
pub use engine::{SimulationEngine, SimulationState};
pub use environment::{Environment, EnvironmentLimits, EnvironmentRule, Incident, Scenario};
pub use error::{SimError, SimResult};
pub use history::{HISTORY_CAPACITY, History, HistorySample, Series};
pub use noise::{FixedNoise, NoiseSource, SeededNoise, ZeroNoise};
pub use physics::LossRates;
pub use prediction::{DEFAULT_HORIZON_HOURS, NextAdjustment, Prediction, RiskLevel};
pub use snapshot::EngineSnapshot;
pub use viability::{FailureCause, ViabilityRules};
