//! # Artifact Loading Module
//!
//! This module is the exclusive entry point for on-disk results artifacts.
//! It reads the tabular case index, the case-to-patient mapping, the model
//! metrics summary, and the run-configuration JSON from a results root and
//! assembles them into one immutable `Bundle`.
//!
//! - Best effort, never fails the whole load: a missing or malformed
//!   artifact degrades to an absent value and a log diagnostic. The public
//!   loader returns a `Bundle` unconditionally; `LoadError` exists only for
//!   the internal readers.
//! - Strict schema at the boundary: index rows are coerced into typed
//!   `CaseRecord` fields, rows that cannot be coerced are skipped
//!   individually, and extra columns are ignored. `case_id` cells are
//!   normalized to string form whatever their CSV spelling.
//! - The loader is a pure function of (root contents, demo flag); caching
//!   lives in `session::LoadCache`, keyed by `(root, demo)`.

use crate::artifacts::{self, ArtifactFlags};
use crate::demo::{DemoConfig, demo_bundle};
use crate::types::{CaseLink, CaseRecord, ModelMetrics, RunConfig, parse_fold_label};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// The immutable in-memory result of one load operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Case index rows in file order; empty when the index is unreadable.
    pub cases: Vec<CaseRecord>,
    pub case_mapping: Option<Vec<CaseLink>>,
    pub metrics_summary: Option<Vec<ModelMetrics>>,
    pub run_config: Option<RunConfig>,
    pub artifacts: ArtifactFlags,
    pub demo: bool,
}

impl Bundle {
    /// The patient link for one case, when the mapping artifact loaded.
    pub fn patient_for(&self, case_id: &str) -> Option<&str> {
        self.case_mapping
            .as_deref()?
            .iter()
            .find(|link| link.case_id == case_id)
            .map(|link| link.patient_id.as_str())
    }
}

/// Failures of the internal readers. These never cross the public loader
/// boundary; they are logged and degraded to absent values.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("required column '{column}' was not found in {path}")]
    ColumnNotFound { column: String, path: String },
    #[error("{0} is not a flat JSON object")]
    NotAnObject(String),
}

/// Load everything under `root`, or synthesize the default demo bundle.
/// Filesystem reads only; never raises across this boundary.
pub fn load_bundle(root: &Path, demo: bool) -> Bundle {
    if demo {
        return demo_bundle(&DemoConfig::default());
    }

    let index_path = artifacts::index_csv_path(root);
    let cases = if index_path.is_file() {
        match internal::read_case_index(&index_path) {
            Ok(cases) => cases,
            Err(err) => {
                warn!("case index unavailable: {err}");
                Vec::new()
            }
        }
    } else {
        debug!("no case index at {}", index_path.display());
        Vec::new()
    };

    let case_mapping = optional_artifact(
        &artifacts::case_mapping_path(root),
        "case mapping",
        internal::read_case_mapping,
    );
    let metrics_summary = optional_artifact(
        &artifacts::metrics_summary_path(root),
        "metrics summary",
        internal::read_metrics_summary,
    );
    let run_config = optional_artifact(
        &artifacts::run_config_path(root),
        "run config",
        internal::read_run_config,
    );

    Bundle {
        cases,
        case_mapping,
        metrics_summary,
        run_config,
        artifacts: ArtifactFlags::probe(root),
        demo: false,
    }
}

/// Absent file is the normal case and stays silent; a present file that
/// fails to read degrades to `None` with a warning.
fn optional_artifact<T>(
    path: &Path,
    label: &str,
    read: impl FnOnce(&Path) -> Result<T, LoadError>,
) -> Option<T> {
    if !path.is_file() {
        return None;
    }
    match read(path) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("{label} unavailable: {err}");
            None
        }
    }
}

/// Internal module for the per-artifact readers.
mod internal {
    use super::*;

    struct IndexColumns {
        case_id: usize,
        fold: usize,
        y_true: usize,
        p_calibrated: usize,
        uncertainty_std: usize,
        risk_band: usize,
    }

    fn locate(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|header| header.trim() == column)
            .ok_or_else(|| LoadError::ColumnNotFound {
                column: column.to_string(),
                path: path.display().to_string(),
            })
    }

    pub(super) fn read_case_index(path: &Path) -> Result<Vec<CaseRecord>, LoadError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let columns = IndexColumns {
            case_id: locate(&headers, "case_id", path)?,
            fold: locate(&headers, "fold", path)?,
            y_true: locate(&headers, "y_true", path)?,
            p_calibrated: locate(&headers, "p_calibrated", path)?,
            uncertainty_std: locate(&headers, "uncertainty_std", path)?,
            risk_band: locate(&headers, "risk_band", path)?,
        };

        let mut cases = Vec::new();
        for (row, record) in reader.records().enumerate() {
            // Header is line 1, so data row `row` sits on line `row + 2`.
            let line = row + 2;
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!("{}: skipping line {line}: {err}", path.display());
                    continue;
                }
            };
            match parse_case_row(&record, &columns) {
                Ok(case) => cases.push(case),
                Err(message) => {
                    warn!("{}: skipping line {line}: {message}", path.display());
                }
            }
        }
        Ok(cases)
    }

    fn cell<'a>(record: &'a csv::StringRecord, index: usize, column: &str) -> Result<&'a str, String> {
        let value = record.get(index).map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Err(format!("missing value in column '{column}'"));
        }
        Ok(value)
    }

    fn unit_interval(record: &csv::StringRecord, index: usize, column: &str) -> Result<f64, String> {
        let raw = cell(record, index, column)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("non-numeric value '{raw}' in column '{column}'"))?;
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(format!("value {value} in column '{column}' is outside [0, 1]"));
        }
        Ok(value)
    }

    fn parse_case_row(record: &csv::StringRecord, columns: &IndexColumns) -> Result<CaseRecord, String> {
        let case_id = cell(record, columns.case_id, "case_id")?.to_string();
        let fold = parse_fold_label(cell(record, columns.fold, "fold")?)?;
        let y_true = cell(record, columns.y_true, "y_true")?.parse()?;
        let p_calibrated = unit_interval(record, columns.p_calibrated, "p_calibrated")?;
        let risk_band = cell(record, columns.risk_band, "risk_band")?.parse()?;

        let raw_uncertainty = cell(record, columns.uncertainty_std, "uncertainty_std")?;
        let uncertainty_std: f64 = raw_uncertainty.parse().map_err(|_| {
            format!("non-numeric value '{raw_uncertainty}' in column 'uncertainty_std'")
        })?;
        if !uncertainty_std.is_finite() || uncertainty_std < 0.0 {
            return Err(format!(
                "value {uncertainty_std} in column 'uncertainty_std' is negative or non-finite"
            ));
        }

        Ok(CaseRecord {
            case_id,
            fold,
            y_true,
            p_calibrated,
            uncertainty_std,
            risk_band,
        })
    }

    pub(super) fn read_case_mapping(path: &Path) -> Result<Vec<CaseLink>, LoadError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let case_id_col = locate(&headers, "case_id", path)?;
        let patient_id_col = locate(&headers, "patient_id", path)?;

        let mut links = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!("{}: skipping line {}: {err}", path.display(), row + 2);
                    continue;
                }
            };
            let case_id = record.get(case_id_col).map(str::trim).unwrap_or_default();
            let patient_id = record.get(patient_id_col).map(str::trim).unwrap_or_default();
            if case_id.is_empty() || patient_id.is_empty() {
                warn!("{}: skipping line {}: incomplete link", path.display(), row + 2);
                continue;
            }
            links.push(CaseLink {
                case_id: case_id.to_string(),
                patient_id: patient_id.to_string(),
            });
        }
        Ok(links)
    }

    pub(super) fn read_metrics_summary(path: &Path) -> Result<Vec<ModelMetrics>, LoadError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for (row, record) in reader.deserialize::<ModelMetrics>().enumerate() {
            match record {
                Ok(metrics) => rows.push(metrics),
                Err(err) => {
                    warn!("{}: skipping line {}: {err}", path.display(), row + 2);
                }
            }
        }
        Ok(rows)
    }

    pub(super) fn read_run_config(path: &Path) -> Result<RunConfig, LoadError> {
        let file = File::open(path)?;
        let value: serde_json::Value = serde_json::from_reader(file)?;
        let serde_json::Value::Object(map) = value else {
            return Err(LoadError::NotAnObject(path.display().to_string()));
        };
        let values: BTreeMap<String, serde_json::Value> = map.into_iter().collect();
        Ok(RunConfig::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "case_id,fold,y_true,p_calibrated,uncertainty_std,risk_band,extra").unwrap();
        writeln!(file, "7001,0,1,0.91,0.04,HIGH,ignored").unwrap();
        writeln!(file, "7002,0,banana,0.91,0.04,HIGH,ignored").unwrap();
        writeln!(file, "7003,1,0,1.91,0.04,LOW,ignored").unwrap();
        writeln!(file, "7004,2,0,0.11,0.04,LOW,ignored").unwrap();
        drop(file);

        let cases = internal::read_case_index(&path).unwrap();
        let ids: Vec<&str> = cases.iter().map(|c| c.case_id.as_str()).collect();
        assert_eq!(ids, vec!["7001", "7004"]);
        assert_eq!(cases[0].case_id, "7001");
    }

    #[test]
    fn missing_required_column_fails_the_whole_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        std::fs::write(&path, "case_id,fold\n7001,0\n").unwrap();
        assert!(matches!(
            internal::read_case_index(&path),
            Err(LoadError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn run_config_must_be_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_config.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            internal::read_run_config(&path),
            Err(LoadError::NotAnObject(_))
        ));
    }
}
