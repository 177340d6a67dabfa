//! History and snapshot export.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use ali_sim::{EngineSnapshot, History, Series};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// History as CSV, one row per sample, columns in `Series::ALL` order.
pub fn history_csv(history: &History) -> String {
    let header: Vec<&str> = Series::ALL.iter().map(Series::name).collect();
    let mut csv = header.join(",");
    csv.push('\n');
    for sample in history.iter() {
        let row: Vec<String> = Series::ALL
            .iter()
            .map(|series| series.value(sample).to_string())
            .collect();
        // Writing into a String cannot fail.
        let _ = writeln!(csv, "{}", row.join(","));
    }
    csv
}

#[derive(Serialize)]
struct SnapshotExport<'a> {
    name: &'a str,
    exported_at: String,
    snapshot: &'a EngineSnapshot,
}

/// Pretty-printed JSON document wrapping `snapshot` with an export timestamp.
pub fn snapshot_json(name: &str, snapshot: &EngineSnapshot) -> AppResult<String> {
    let export = SnapshotExport {
        name,
        exported_at: chrono::Utc::now().to_rfc3339(),
        snapshot,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

pub fn write_history_csv(path: &Path, history: &History) -> AppResult<()> {
    fs::write(path, history_csv(history)).map_err(|source| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_snapshot_json(path: &Path, name: &str, snapshot: &EngineSnapshot) -> AppResult<()> {
    let json = snapshot_json(name, snapshot)?;
    fs::write(path, json).map_err(|source| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ali_sim::{SimulationEngine, ZeroNoise};

    fn engine_after(hours: f64) -> SimulationEngine {
        let mut engine = SimulationEngine::with_defaults()
            .unwrap()
            .with_noise(ZeroNoise);
        let steps = (hours / 0.1).round() as usize;
        for _ in 0..steps {
            engine.step(0.1);
        }
        engine
    }

    #[test]
    fn csv_has_header_and_one_row_per_sample() {
        let engine = engine_after(2.0);
        let csv = history_csv(engine.history());
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), Series::ALL.len());
        assert!(header.starts_with("time,"));
        assert_eq!(lines.count(), engine.history().len());
    }

    #[test]
    fn empty_history_is_header_only() {
        let csv = history_csv(&History::default());
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn snapshot_json_carries_state_and_timestamp() {
        let engine = engine_after(1.0);
        let json = snapshot_json("unit", &engine.snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "unit");
        assert!(value["exported_at"].as_str().is_some());
        assert_eq!(value["snapshot"]["scenario"], "normal");
        assert!(value["snapshot"]["prediction"]["risk_level"].is_string());
        assert!(value["snapshot"]["history"].is_array());
    }

    #[test]
    fn write_to_missing_directory_reports_path() {
        let path = std::env::temp_dir()
            .join("ali_app_no_such_dir")
            .join("nested")
            .join("history.csv");
        let err = write_history_csv(&path, &History::default()).unwrap_err();
        match err {
            AppError::FileWrite { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
