//! Integration tests: load shipped configs and round-trip through both formats.

use std::path::PathBuf;

use ali_project::{
    LATEST_VERSION, ProjectError, SessionConfig, TimelineAction, load, load_json, load_yaml,
    save_json, save_yaml,
};
use ali_sim::{Incident, Scenario};

fn configs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../configs")
}

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ali_project_roundtrip_{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    dir.join(name)
}

#[test]
fn shipped_configs_load() {
    let baseline = load_yaml(&configs_dir().join("baseline.yaml")).expect("baseline");
    assert_eq!(baseline.version, LATEST_VERSION);
    assert_eq!(baseline.run.duration_hours, 72.0);
    assert!(baseline.timeline.is_empty());

    let heater = load(&configs_dir().join("heater_failure.yaml")).expect("heater_failure");
    assert_eq!(heater.run.seed, Some(7));
    assert_eq!(heater.timeline.len(), 2);
    assert_eq!(
        heater.timeline[0].action,
        TimelineAction::TriggerIncident {
            incident: Some(Incident::HumidityDrop)
        }
    );
    assert_eq!(
        heater.timeline[1].action,
        TimelineAction::SetScenario {
            scenario: Scenario::Temperature
        }
    );
}

#[test]
fn yaml_and_json_round_trip() {
    let loaded = load_yaml(&configs_dir().join("heater_failure.yaml")).expect("load");

    let yaml_path = temp_path("heater.yaml");
    save_yaml(&yaml_path, &loaded).expect("save yaml");
    let from_yaml: SessionConfig = load_yaml(&yaml_path).expect("reload yaml");
    assert_eq!(from_yaml, loaded);

    let json_path = temp_path("heater.json");
    save_json(&json_path, &loaded).expect("save json");
    let from_json = load_json(&json_path).expect("reload json");
    assert_eq!(from_json, loaded);
    let by_extension = load(&json_path).expect("load by extension");
    assert_eq!(by_extension, loaded);
}

#[test]
fn saving_invalid_config_fails() {
    let mut config = SessionConfig::default();
    config.run.speed = -1.0;
    let err = save_yaml(&temp_path("invalid.yaml"), &config).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_yaml(&temp_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::Io(_)));
}
