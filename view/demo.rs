//! # Synthetic Demo Bundle
//!
//! Seeded generation of a representative in-memory dataset for previewing
//! the viewer without a results root. Two calls with the same `DemoConfig`
//! produce byte-identical bundles; the banding of every synthetic row goes
//! through the same `BandPolicy` as production data so the demo never shows
//! a band/probability combination real data could not.

use crate::artifacts::ArtifactFlags;
use crate::data::Bundle;
use crate::types::{BandPolicy, CaseLink, CaseRecord, TrueClass};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};

/// Parameters of the synthetic cohort. Defaults mirror the production
/// loader's demo: 25 cases, 85% disease-positive, Beta(3, 4) calibrated
/// probabilities, uniform uncertainty in [0.02, 0.15], three CV folds.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub n_cases: usize,
    pub seed: u64,
    /// Probability that a synthetic case is disease-positive.
    pub positive_rate: f64,
    /// Shape parameters of the Beta distribution drawn for `p_calibrated`.
    pub beta_shape: (f64, f64),
    /// Inclusive range drawn uniformly for `uncertainty_std`.
    pub uncertainty_range: (f64, f64),
    /// Folds are drawn uniformly from `0..n_folds`.
    pub n_folds: u32,
    pub bands: BandPolicy,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            n_cases: 25,
            seed: 42,
            positive_rate: 0.85,
            beta_shape: (3.0, 4.0),
            uncertainty_range: (0.02, 0.15),
            n_folds: 3,
            bands: BandPolicy::default(),
        }
    }
}

/// Build the synthetic bundle. File-backed artifacts are all absent; the
/// case mapping carries clearly-synthetic `DEMO-*` patient identifiers.
pub fn demo_bundle(config: &DemoConfig) -> Bundle {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let beta = Beta::new(config.beta_shape.0, config.beta_shape.1)
        .expect("demo beta shape parameters are positive");

    let mut cases = Vec::with_capacity(config.n_cases);
    let mut links = Vec::with_capacity(config.n_cases);
    for i in 1..=config.n_cases {
        let case_id = format!("Case-{i:02}");
        let p_calibrated = beta.sample(&mut rng);
        let case = CaseRecord {
            case_id: case_id.clone(),
            fold: rng.gen_range(0..config.n_folds),
            y_true: if rng.gen_bool(config.positive_rate) {
                TrueClass::Disease
            } else {
                TrueClass::Healthy
            },
            p_calibrated,
            uncertainty_std: rng.gen_range(config.uncertainty_range.0..=config.uncertainty_range.1),
            risk_band: config.bands.band_for(p_calibrated),
        };
        cases.push(case);
        links.push(CaseLink {
            case_id,
            patient_id: format!("DEMO-{i}"),
        });
    }

    Bundle {
        cases,
        case_mapping: Some(links),
        metrics_summary: None,
        run_config: None,
        artifacts: ArtifactFlags::demo(),
        demo: true,
    }
}
