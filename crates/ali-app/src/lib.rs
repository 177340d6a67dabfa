//! Headless driver layer for the ALI chamber simulation.
//!
//! This crate sits between the engine and any front end (CLI today). It owns
//! the per-session policy that is not part of the physical model: alert
//! latches, incident timers, scripted timelines, the event log, status bands
//! for readings, and history export.

pub mod alerts;
pub mod error;
pub mod event_log;
pub mod export;
pub mod session;
pub mod status;

// Re-export key types for convenience
pub use alerts::{Alert, AlertMonitor, AlertThresholds};
pub use error::{AppError, AppResult};
pub use event_log::{EventLog, LOG_CAPACITY, LogEntry, LogLevel};
pub use export::{history_csv, snapshot_json, write_history_csv, write_snapshot_json};
pub use session::{RunSummary, Session, SessionOptions};
pub use status::{EnvironmentStatus, NominalBands, StatusBand, format_sim_time, risk_label};
