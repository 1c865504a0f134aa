//! # Conjunctive Case Filter
//!
//! A `FilterState` is a set of independently-adjustable constraints over the
//! case index. Constraints combine with AND across fields; set-membership
//! constraints combine with OR within a field. An empty set, an absent
//! range, or an empty search string means "no constraint from this field",
//! never "match nothing". Filtering is pure and order-preserving.

use crate::types::{CaseRecord, RiskBand, TrueClass};
use std::collections::BTreeSet;

/// Per-view filter selections. Each logical view owns its own instance
/// (see `session::Session`); there is no shared singleton.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    pub risk_bands: BTreeSet<RiskBand>,
    pub classes: BTreeSet<TrueClass>,
    pub folds: BTreeSet<u32>,
    /// Closed interval over `p_calibrated`, inclusive on both bounds.
    pub prob_range: Option<(f64, f64)>,
    /// Closed interval over `uncertainty_std`, inclusive on both bounds.
    pub uncert_range: Option<(f64, f64)>,
    /// Case-insensitive substring match on `case_id`.
    pub search: Option<String>,
}

impl FilterState {
    /// True when every field is unconstrained, i.e. `apply` is the identity.
    pub fn is_unconstrained(&self) -> bool {
        self.risk_bands.is_empty()
            && self.classes.is_empty()
            && self.folds.is_empty()
            && self.prob_range.is_none()
            && self.uncert_range.is_none()
            && !self.has_search()
    }

    fn has_search(&self) -> bool {
        self.search
            .as_deref()
            .is_some_and(|needle| !needle.trim().is_empty())
    }

    /// Whether one case satisfies every active constraint.
    pub fn matches(&self, case: &CaseRecord) -> bool {
        if !self.risk_bands.is_empty() && !self.risk_bands.contains(&case.risk_band) {
            return false;
        }
        if !self.classes.is_empty() && !self.classes.contains(&case.y_true) {
            return false;
        }
        if !self.folds.is_empty() && !self.folds.contains(&case.fold) {
            return false;
        }
        if let Some((lo, hi)) = self.prob_range {
            if case.p_calibrated < lo || case.p_calibrated > hi {
                return false;
            }
        }
        if let Some((lo, hi)) = self.uncert_range {
            if case.uncertainty_std < lo || case.uncertainty_std > hi {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.trim();
            if !needle.is_empty()
                && !case.case_id.to_lowercase().contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Reduce a case index to the rows matching `state`, preserving input
/// order. The input is never mutated; an empty input comes back empty.
pub fn apply(cases: &[CaseRecord], state: &FilterState) -> Vec<CaseRecord> {
    cases
        .iter()
        .filter(|case| state.matches(case))
        .cloned()
        .collect()
}

/// Same reduction, but yielding row indices into `cases`. Lets callers
/// avoid cloning records when they only need to address the originals.
pub fn apply_indices(cases: &[CaseRecord], state: &FilterState) -> Vec<usize> {
    cases
        .iter()
        .enumerate()
        .filter(|(_, case)| state.matches(case))
        .map(|(idx, _)| idx)
        .collect()
}
