//! # Results-Root Layout and Availability Probing
//!
//! All knowledge of the on-disk layout of a results root lives here: the
//! relative paths of every expected artifact, the validation gate used
//! before connecting a root, and the availability flags computed once per
//! load. Callers outside this module never build artifact paths by hand,
//! and nothing here reveals absolute paths to the presentation layer.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Relative names of the artifacts a root must contain to be usable.
pub const REQUIRED_ARTIFACTS: [&str; 2] = [
    "explainability_reports/index.csv",
    "explainability_reports/case_mapping.csv",
];

pub fn explainability_dir(root: &Path) -> PathBuf {
    root.join("explainability_reports")
}

pub fn index_csv_path(root: &Path) -> PathBuf {
    explainability_dir(root).join("index.csv")
}

pub fn case_mapping_path(root: &Path) -> PathBuf {
    explainability_dir(root).join("case_mapping.csv")
}

pub fn metrics_summary_path(root: &Path) -> PathBuf {
    root.join("patient_metrics_summary.csv")
}

pub fn run_config_path(root: &Path) -> PathBuf {
    root.join("run_config.json")
}

/// Hard gate before connecting a non-demo root: checks the minimum artifact
/// set and reports the missing entries by relative name only, so callers
/// can show "N files missing" without leaking filesystem structure.
/// Independent of the loader; may be called without loading.
pub fn validate_root(root: &Path) -> (bool, Vec<String>) {
    let mut missing = Vec::new();
    for relative in REQUIRED_ARTIFACTS {
        if !root.join(relative).is_file() {
            missing.push(relative.to_string());
        }
    }
    (missing.is_empty(), missing)
}

/// Path to one case's explainability image, existence-checked so the
/// presentation layer can render or offer it conditionally.
pub fn image_path_for(root: &Path, case_id: &str) -> Option<PathBuf> {
    let path = explainability_dir(root).join(format!("{case_id}.png"));
    if path.is_file() { Some(path) } else { None }
}

/// The last path component of the root, but only when it is a simple name.
/// Anything carrying separators or drive colons is suppressed rather than
/// shown.
pub fn display_folder_name(root: &Path) -> Option<String> {
    let name = root.file_name()?.to_str()?;
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains(':') {
        return None;
    }
    Some(name.to_string())
}

/// Which optional files exist under a root, computed once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtifactFlags {
    pub index_csv: bool,
    pub case_mapping: bool,
    pub metrics_summary: bool,
    pub run_config: bool,
    pub calibration_plots: bool,
    pub roc_curves: bool,
    pub pr_curves: bool,
    pub confusion_matrix: bool,
    pub case_images: bool,
    pub case_image_count: usize,
}

impl ArtifactFlags {
    /// Probe every expected artifact path under `root`. Per the layout
    /// contract each `*.png` in the explainability directory is one case
    /// image, whatever the identifier looks like.
    pub fn probe(root: &Path) -> Self {
        let case_image_count = count_pngs(&explainability_dir(root));
        let flags = Self {
            index_csv: index_csv_path(root).is_file(),
            case_mapping: case_mapping_path(root).is_file(),
            metrics_summary: metrics_summary_path(root).is_file(),
            run_config: run_config_path(root).is_file(),
            calibration_plots: count_pngs(&root.join("calibration_plots")) > 0,
            roc_curves: root.join("roc_curves_patient_level.png").is_file(),
            pr_curves: root.join("pr_curves_patient_level.png").is_file(),
            confusion_matrix: root.join("confusion_matrices_patient_level.png").is_file(),
            case_images: case_image_count > 0,
            case_image_count,
        };
        debug!("probed artifacts: {flags:?}");
        flags
    }

    /// The fixed flag set of a synthetic bundle: the tabular artifacts are
    /// present by construction, every file-backed one is absent.
    pub fn demo() -> Self {
        Self {
            index_csv: true,
            case_mapping: true,
            ..Self::default()
        }
    }
}

fn count_pngs(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn validate_reports_missing_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(explainability_dir(root)).unwrap();
        fs::write(index_csv_path(root), "case_id\n").unwrap();

        let (is_valid, missing) = validate_root(root);
        assert!(!is_valid);
        assert_eq!(missing, vec!["explainability_reports/case_mapping.csv"]);

        fs::write(case_mapping_path(root), "case_id,patient_id\n").unwrap();
        let (is_valid, missing) = validate_root(root);
        assert!(is_valid);
        assert!(missing.is_empty());
    }

    #[test]
    fn image_probe_requires_the_file_to_exist() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(explainability_dir(root)).unwrap();
        assert!(image_path_for(root, "Case-01").is_none());

        fs::write(explainability_dir(root).join("Case-01.png"), b"png").unwrap();
        let path = image_path_for(root, "Case-01").unwrap();
        assert!(path.ends_with("explainability_reports/Case-01.png"));
    }

    #[test]
    fn folder_names_with_separators_are_suppressed() {
        assert_eq!(
            display_folder_name(Path::new("/data/run_042")),
            Some("run_042".to_string())
        );
        assert_eq!(display_folder_name(Path::new("/")), None);
    }

    #[test]
    fn probe_counts_case_images_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(explainability_dir(root)).unwrap();
        fs::write(explainability_dir(root).join("7001.png"), b"png").unwrap();
        fs::write(explainability_dir(root).join("7002.PNG"), b"png").unwrap();
        fs::write(explainability_dir(root).join("index.csv"), "case_id\n").unwrap();

        let flags = ArtifactFlags::probe(root);
        assert!(flags.index_csv);
        assert!(!flags.case_mapping);
        assert!(flags.case_images);
        assert_eq!(flags.case_image_count, 2);
        assert!(!flags.roc_curves);
    }
}
