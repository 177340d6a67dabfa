//! Error types for the ali-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and provides a unified error interface for front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Project(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ali-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ali_project::ProjectError> for AppError {
    fn from(err: ali_project::ProjectError) -> Self {
        AppError::Project(err.to_string())
    }
}

impl From<ali_sim::SimError> for AppError {
    fn from(err: ali_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
