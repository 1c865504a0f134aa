//! # Summary Reducers
//!
//! Pure reducers over a (possibly filtered) case view. Nothing here touches
//! the filesystem or mutates its input; every function is a plain fold over
//! the slice it is handed.

use crate::types::{CaseRecord, RiskBand, TrueClass};

/// Count the rows satisfying `pred`.
pub fn count_where<F>(view: &[CaseRecord], pred: F) -> usize
where
    F: Fn(&CaseRecord) -> bool,
{
    view.iter().filter(|case| pred(case)).count()
}

/// Mean of a projected field. An empty view yields 0.0; that is the
/// documented display default, not an error.
pub fn mean<F>(view: &[CaseRecord], project: F) -> f64
where
    F: Fn(&CaseRecord) -> f64,
{
    if view.is_empty() {
        return 0.0;
    }
    view.iter().map(project).sum::<f64>() / view.len() as f64
}

/// The `n` rows with the largest projected values, descending. The sort is
/// stable, so ties keep their original order; fewer than `n` rows means all
/// of them come back.
pub fn top_n<F>(view: &[CaseRecord], project: F, n: usize) -> Vec<&CaseRecord>
where
    F: Fn(&CaseRecord) -> f64,
{
    let mut ranked: Vec<&CaseRecord> = view.iter().collect();
    ranked.sort_by(|a, b| project(b).total_cmp(&project(a)));
    ranked.truncate(n);
    ranked
}

/// Per-band counts in ascending risk order.
pub fn band_distribution(view: &[CaseRecord]) -> [(RiskBand, usize); 4] {
    RiskBand::ALL.map(|band| {
        let count = view.iter().filter(|case| case.risk_band == band).count();
        (band, count)
    })
}

/// The KPI row: headline counts and means for one filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortSummary {
    pub n_cases: usize,
    pub n_disease: usize,
    pub n_healthy: usize,
    pub n_high_risk: usize,
    /// Share of HIGH-band rows in percent; 0.0 for an empty view.
    pub pct_high_risk: f64,
    pub mean_probability: f64,
    pub mean_uncertainty: f64,
}

pub fn summarize(view: &[CaseRecord]) -> CohortSummary {
    let n_cases = view.len();
    let n_disease = count_where(view, |case| case.y_true == TrueClass::Disease);
    let n_high_risk = count_where(view, |case| case.risk_band == RiskBand::High);
    let pct_high_risk = if n_cases == 0 {
        0.0
    } else {
        n_high_risk as f64 / n_cases as f64 * 100.0
    };
    CohortSummary {
        n_cases,
        n_disease,
        n_healthy: n_cases - n_disease,
        n_high_risk,
        pct_high_risk,
        mean_probability: mean(view, |case| case.p_calibrated),
        mean_uncertainty: mean(view, |case| case.uncertainty_std),
    }
}
