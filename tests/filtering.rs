use cohort::aggregate::{mean, summarize, top_n};
use cohort::demo::{DemoConfig, demo_bundle};
use cohort::filter::{FilterState, apply};
use cohort::types::{BandPolicy, CaseRecord, RiskBand, TrueClass};
use std::collections::BTreeSet;

fn case(id: &str, p: f64, band: RiskBand) -> CaseRecord {
    CaseRecord {
        case_id: id.to_string(),
        fold: 0,
        y_true: TrueClass::Disease,
        p_calibrated: p,
        uncertainty_std: 0.05,
        risk_band: band,
    }
}

fn demo_cases() -> Vec<CaseRecord> {
    demo_bundle(&DemoConfig::default()).cases
}

#[test]
fn unconstrained_filter_is_the_identity() {
    let cases = demo_cases();
    let state = FilterState::default();
    assert_eq!(apply(&cases, &state), cases);

    // Explicit full-range bounds are still the identity on valid data.
    let full_range = FilterState {
        prob_range: Some((0.0, 1.0)),
        uncert_range: Some((0.0, f64::INFINITY)),
        ..FilterState::default()
    };
    assert_eq!(apply(&cases, &full_range), cases);
}

#[test]
fn filter_is_sound_and_complete() {
    let cases = demo_cases();
    let state = FilterState {
        risk_bands: [RiskBand::Moderate, RiskBand::High].into_iter().collect(),
        classes: [TrueClass::Disease].into_iter().collect(),
        prob_range: Some((0.2, 0.95)),
        ..FilterState::default()
    };

    let kept = apply(&cases, &state);
    // Soundness: every surviving row satisfies every active constraint.
    for row in &kept {
        assert!(state.matches(row));
    }
    // Completeness: no satisfying row was dropped.
    let expected = cases.iter().filter(|row| state.matches(row)).count();
    assert_eq!(kept.len(), expected);
}

#[test]
fn filter_is_idempotent() {
    let cases = demo_cases();
    let state = FilterState {
        folds: [0, 2].into_iter().collect(),
        uncert_range: Some((0.03, 0.12)),
        ..FilterState::default()
    };
    let once = apply(&cases, &state);
    let twice = apply(&once, &state);
    assert_eq!(once, twice);
}

#[test]
fn high_band_scenario_keeps_exactly_the_high_rows() {
    let cases = vec![
        case("a", 0.10, RiskBand::Low),
        case("b", 0.90, RiskBand::High),
        case("c", 0.85, RiskBand::High),
    ];
    let state = FilterState {
        risk_bands: BTreeSet::from([RiskBand::High]),
        ..FilterState::default()
    };
    let kept = apply(&cases, &state);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().all(|row| row.risk_band == RiskBand::High));
}

#[test]
fn probability_range_is_inclusive_on_both_bounds() {
    let cases = vec![
        case("a", 0.2, RiskBand::Low),
        case("b", 0.5, RiskBand::Moderate),
        case("c", 0.9, RiskBand::High),
    ];
    let state = FilterState {
        prob_range: Some((0.5, 1.0)),
        ..FilterState::default()
    };
    let kept = apply(&cases, &state);
    let ids: Vec<&str> = kept.iter().map(|row| row.case_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[test]
fn top_n_with_oversized_n_returns_everything_sorted() {
    let cases = vec![
        case("mid", 0.5, RiskBand::Moderate),
        case("high", 0.9, RiskBand::High),
        case("tie-early", 0.3, RiskBand::LowMod),
        case("tie-late", 0.3, RiskBand::LowMod),
    ];
    let ranked = top_n(&cases, |row| row.p_calibrated, 100);
    let ids: Vec<&str> = ranked.iter().map(|row| row.case_id.as_str()).collect();
    assert_eq!(ids, vec!["high", "mid", "tie-early", "tie-late"]);
}

#[test]
fn mean_on_an_empty_view_is_zero_not_an_error() {
    assert_eq!(mean(&[], |row| row.p_calibrated), 0.0);
    let empty = summarize(&[]);
    assert_eq!(empty.n_cases, 0);
    assert_eq!(empty.pct_high_risk, 0.0);
}

#[test]
fn demo_bands_are_consistent_with_the_threshold_policy() {
    let policy = BandPolicy::default();
    for row in demo_cases() {
        assert_eq!(row.risk_band, policy.band_for(row.p_calibrated));
    }
}

#[test]
fn filtered_views_feed_the_aggregator_unchanged() {
    let cases = demo_cases();
    let state = FilterState {
        risk_bands: BTreeSet::from([RiskBand::High]),
        ..FilterState::default()
    };
    let kept = apply(&cases, &state);
    let summary = summarize(&kept);
    assert_eq!(summary.n_cases, kept.len());
    assert_eq!(summary.n_high_risk, kept.len());
    if !kept.is_empty() {
        assert_eq!(summary.pct_high_risk, 100.0);
    }
}
