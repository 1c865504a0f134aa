// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Discrete risk bucket derived from a calibrated probability at
/// data-generation time. The viewer trusts the stored band and never
/// recomputes it from `p_calibrated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskBand {
    Low,
    LowMod,
    Moderate,
    High,
}

impl RiskBand {
    /// All bands in ascending order of risk.
    pub const ALL: [RiskBand; 4] = [
        RiskBand::Low,
        RiskBand::LowMod,
        RiskBand::Moderate,
        RiskBand::High,
    ];

    /// The exact spelling used in `index.csv`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "LOW",
            RiskBand::LowMod => "LOW-MOD",
            RiskBand::Moderate => "MODERATE",
            RiskBand::High => "HIGH",
        }
    }

    /// Status-chip color hint for the presentation layer.
    pub fn color(&self) -> &'static str {
        match self {
            RiskBand::Low => "#28a745",
            RiskBand::LowMod => "#ffc107",
            RiskBand::Moderate => "#fd7e14",
            RiskBand::High => "#dc3545",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LOW" => Ok(RiskBand::Low),
            "LOW-MOD" => Ok(RiskBand::LowMod),
            "MODERATE" => Ok(RiskBand::Moderate),
            "HIGH" => Ok(RiskBand::High),
            other => Err(format!(
                "Invalid risk band '{other}'. Expected LOW, LOW-MOD, MODERATE, or HIGH."
            )),
        }
    }
}

/// Ground-truth binary class: 0 = healthy control, 1 = disease-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrueClass {
    Healthy,
    Disease,
}

impl TrueClass {
    pub fn as_u8(&self) -> u8 {
        match self {
            TrueClass::Healthy => 0,
            TrueClass::Disease => 1,
        }
    }
}

impl fmt::Display for TrueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrueClass::Healthy => f.write_str("healthy"),
            TrueClass::Disease => f.write_str("disease"),
        }
    }
}

impl FromStr for TrueClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Tabular writers disagree on integer formatting, so "1" and "1.0"
        // must both parse.
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid class label '{}'. Expected 0 or 1.", s.trim()))?;
        if value == 0.0 {
            Ok(TrueClass::Healthy)
        } else if value == 1.0 {
            Ok(TrueClass::Disease)
        } else {
            Err(format!("Invalid class label '{value}'. Expected 0 or 1."))
        }
    }
}

/// Parse a fold index, tolerating float spellings of whole numbers.
pub fn parse_fold_label(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    if let Ok(fold) = trimmed.parse::<u32>() {
        return Ok(fold);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| format!("Invalid fold '{trimmed}'. Expected a small non-negative integer."))?;
    if value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(format!(
            "Invalid fold '{trimmed}'. Expected a small non-negative integer."
        ))
    }
}

/// The three ascending thresholds partitioning [0, 1] into the four risk
/// bands. Banding happens at data-generation time; the viewer only needs
/// this policy to synthesize representative demo data and to audit stored
/// bands against probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPolicy {
    pub low_mod: f64,
    pub moderate: f64,
    pub high: f64,
}

impl BandPolicy {
    pub fn new(low_mod: f64, moderate: f64, high: f64) -> Result<Self, String> {
        let ascending = 0.0 < low_mod && low_mod < moderate && moderate < high && high < 1.0;
        if !ascending {
            return Err(format!(
                "Band thresholds must satisfy 0 < {low_mod} < {moderate} < {high} < 1."
            ));
        }
        Ok(Self {
            low_mod,
            moderate,
            high,
        })
    }

    pub fn band_for(&self, p_calibrated: f64) -> RiskBand {
        if p_calibrated < self.low_mod {
            RiskBand::Low
        } else if p_calibrated < self.moderate {
            RiskBand::LowMod
        } else if p_calibrated < self.high {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self {
            low_mod: 0.30,
            moderate: 0.50,
            high: 0.75,
        }
    }
}

/// One evaluated subject: a prediction and its supporting values.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub case_id: String,
    pub fold: u32,
    pub y_true: TrueClass,
    pub p_calibrated: f64,
    pub uncertainty_std: f64,
    pub risk_band: RiskBand,
}

/// Auxiliary case-to-patient link from `case_mapping.csv`. The secondary
/// identifier is opaque to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseLink {
    pub case_id: String,
    pub patient_id: String,
}

/// One row of `patient_metrics_summary.csv`. Every metric column is
/// optional so partially-populated summaries still load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelMetrics {
    #[serde(default)]
    pub model: String,
    #[serde(rename = "AUC", default)]
    pub auc: Option<f64>,
    #[serde(rename = "PR_AUC", default)]
    pub pr_auc: Option<f64>,
    #[serde(rename = "Sensitivity", default)]
    pub sensitivity: Option<f64>,
    #[serde(rename = "Specificity", default)]
    pub specificity: Option<f64>,
    #[serde(rename = "Accuracy", default)]
    pub accuracy: Option<f64>,
    #[serde(rename = "F1", default)]
    pub f1: Option<f64>,
}

/// Flat provenance bag from `run_config.json`, passed through for display.
/// Recognized keys get typed accessors; everything else is preserved but
/// not interpreted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunConfig {
    values: BTreeMap<String, serde_json::Value>,
}

impl RunConfig {
    pub fn from_values(values: BTreeMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Render a recognized key for display. Missing keys and non-scalar
    /// values come back as "N/A".
    pub fn display(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Bool(b)) => b.to_string(),
            _ => "N/A".to_string(),
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.values.get("timestamp").and_then(|v| v.as_str())
    }

    pub fn n_patients(&self) -> Option<u64> {
        self.values.get("n_patients").and_then(|v| v.as_u64())
    }

    pub fn n_masld(&self) -> Option<u64> {
        self.values.get("n_masld").and_then(|v| v.as_u64())
    }

    pub fn n_healthy(&self) -> Option<u64> {
        self.values.get("n_healthy").and_then(|v| v.as_u64())
    }
}
