//! Session configuration validation.

use crate::schema::{RunDef, SessionConfig};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Timeline event {index} at {at_hours} h precedes the event before it")]
    UnorderedTimeline { index: usize, at_hours: f64 },

    #[error("Invalid chamber model: {0}")]
    Model(#[from] ali_sim::SimError),
}

pub fn validate_config(config: &SessionConfig) -> Result<(), ValidationError> {
    if config.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    config.constants.validate()?;
    config.gains.build(config.constants.max_pump_flow)?;

    validate_run(&config.run)?;

    let mut previous = 0.0;
    for (index, event) in config.timeline.iter().enumerate() {
        if !event.at_hours.is_finite() || event.at_hours < 0.0 {
            return Err(invalid(
                format!("timeline[{index}].at_hours"),
                event.at_hours,
                "must be finite and non-negative",
            ));
        }
        if event.at_hours < previous {
            return Err(ValidationError::UnorderedTimeline {
                index,
                at_hours: event.at_hours,
            });
        }
        previous = event.at_hours;
    }

    Ok(())
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    let positive = [
        ("run.dt_hours", run.dt_hours),
        ("run.incident_duration_hours", run.incident_duration_hours),
        ("run.speed", run.speed),
    ];
    for (field, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(field.to_string(), value, "must be positive"));
        }
    }
    if !run.duration_hours.is_finite() || run.duration_hours < 0.0 {
        return Err(invalid(
            "run.duration_hours".to_string(),
            run.duration_hours,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

fn invalid(field: String, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
