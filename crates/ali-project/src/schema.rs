//! Session configuration schema.

use ali_sim::{ChamberConstants, ControllerGains, Incident, Scenario};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub constants: ChamberConstants,
    #[serde(default)]
    pub gains: ControllerGains,
    #[serde(default)]
    pub run: RunDef,
    /// Scenario in force from t = 0.
    #[serde(default)]
    pub scenario: Scenario,
    /// Commands applied once simulated time reaches `at_hours`, in order.
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: String::new(),
            constants: ChamberConstants::default(),
            gains: ControllerGains::default(),
            run: RunDef::default(),
            scenario: Scenario::default(),
            timeline: Vec::new(),
        }
    }
}

fn default_version() -> u32 {
    crate::LATEST_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunDef {
    /// Seed for environmental noise. None uses the engine default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Simulated hours per step.
    pub dt_hours: f64,
    /// Simulated hours to run.
    pub duration_hours: f64,
    /// Simulated hours an incident lasts before the session stops it.
    pub incident_duration_hours: f64,
    /// Simulated minutes per wall-clock second when paced in real time.
    pub speed: f64,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            seed: None,
            dt_hours: 0.05,
            duration_hours: 72.0,
            incident_duration_hours: 2.0,
            speed: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub at_hours: f64,
    #[serde(flatten)]
    pub action: TimelineAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TimelineAction {
    SetScenario {
        scenario: Scenario,
    },
    TriggerIncident {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        incident: Option<Incident>,
    },
    StopIncident,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: SessionConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.constants.target_volume, 1.5);
        assert_eq!(config.run.dt_hours, 0.05);
    }

    #[test]
    fn partial_constants_fill_from_defaults() {
        let yaml = "constants:\n  target_volume: 2.0\ngains:\n  kp: 0.8\n";
        let config: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.constants.target_volume, 2.0);
        assert_eq!(config.constants.tolerance_volume, 0.1);
        assert_eq!(config.gains.kp, 0.8);
        assert_eq!(config.gains.ki, 0.1);
    }

    #[test]
    fn timeline_actions_parse() {
        let yaml = r#"
scenario: normal
timeline:
  - at_hours: 1.0
    action: set_scenario
    scenario: evaporation
  - at_hours: 2.0
    action: trigger_incident
    incident: temperature_spike
  - at_hours: 3.0
    action: trigger_incident
  - at_hours: 4.0
    action: stop_incident
"#;
        let config: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.timeline.len(), 4);
        assert_eq!(
            config.timeline[0].action,
            TimelineAction::SetScenario {
                scenario: Scenario::Evaporation
            }
        );
        assert_eq!(
            config.timeline[1].action,
            TimelineAction::TriggerIncident {
                incident: Some(Incident::TemperatureSpike)
            }
        );
        assert_eq!(
            config.timeline[2].action,
            TimelineAction::TriggerIncident { incident: None }
        );
        assert_eq!(config.timeline[3].action, TimelineAction::StopIncident);
    }

    #[test]
    fn unknown_scenario_is_a_parse_error() {
        let yaml = "scenario: blizzard\n";
        assert!(serde_yaml::from_str::<SessionConfig>(yaml).is_err());
    }
}
