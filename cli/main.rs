#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use cohort::aggregate;
use cohort::artifacts;
use cohort::data::{self, Bundle};
use cohort::filter::{self, FilterState};
use cohort::types::{CaseRecord, RiskBand, TrueClass};

#[derive(Parser)]
#[command(
    name = "cohort",
    version,
    about = "Terminal viewer for calibrated patient-level risk prediction results"
)]
struct Cli {
    /// Path to the results folder produced by the evaluation pipeline
    #[arg(long, global = true, default_value = "../results")]
    root: PathBuf,

    /// Use synthetic demo data instead of reading the results folder
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the results folder contains the required artifacts
    Validate,
    /// Print cohort KPIs, the risk-band distribution, and run information
    Summary,
    /// List cases matching the given filters
    Cases(CaseFilterArgs),
    /// Show one case in detail
    Case {
        /// Case identifier as it appears in the index
        case_id: String,
    },
}

#[derive(Args)]
struct CaseFilterArgs {
    /// Keep only these risk bands (repeatable): LOW, LOW-MOD, MODERATE, HIGH
    #[arg(long = "band", value_name = "BAND")]
    bands: Vec<RiskBand>,

    /// Keep only this ground-truth class (repeatable): 0 = healthy, 1 = disease
    #[arg(long = "class", value_name = "CLASS")]
    classes: Vec<TrueClass>,

    /// Keep only these cross-validation folds (repeatable)
    #[arg(long = "fold", value_name = "FOLD")]
    folds: Vec<u32>,

    /// Lower bound on calibrated probability (inclusive)
    #[arg(long, value_name = "P")]
    prob_min: Option<f64>,

    /// Upper bound on calibrated probability (inclusive)
    #[arg(long, value_name = "P")]
    prob_max: Option<f64>,

    /// Lower bound on prediction uncertainty (inclusive)
    #[arg(long, value_name = "STD")]
    uncert_min: Option<f64>,

    /// Upper bound on prediction uncertainty (inclusive)
    #[arg(long, value_name = "STD")]
    uncert_max: Option<f64>,

    /// Case-insensitive substring to search for in case identifiers
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Also print the N highest-risk cases
    #[arg(long, value_name = "N")]
    top_risk: Option<usize>,

    /// Also print the N most uncertain cases
    #[arg(long, value_name = "N")]
    top_uncertain: Option<usize>,
}

impl CaseFilterArgs {
    fn to_filter_state(&self) -> FilterState {
        FilterState {
            risk_bands: self.bands.iter().copied().collect(),
            classes: self.classes.iter().copied().collect(),
            folds: self.folds.iter().copied().collect(),
            prob_range: range_from(self.prob_min, self.prob_max, 1.0),
            uncert_range: range_from(self.uncert_min, self.uncert_max, f64::INFINITY),
            search: self.search.clone(),
        }
    }
}

fn range_from(min: Option<f64>, max: Option<f64>, unbounded_hi: f64) -> Option<(f64, f64)> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some((min.unwrap_or(0.0), max.unwrap_or(unbounded_hi)))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate => run_validate(&cli.root, cli.demo),
        Command::Summary => run_summary(&cli.root, cli.demo),
        Command::Cases(filters) => run_cases(&cli.root, cli.demo, &filters),
        Command::Case { case_id } => run_case(&cli.root, cli.demo, &case_id),
    }
}

fn run_validate(root: &Path, demo: bool) {
    if demo {
        println!("Connected: DEMO (synthetic data)");
        return;
    }
    let (is_valid, missing) = artifacts::validate_root(root);
    if is_valid {
        let folder = artifacts::display_folder_name(root).unwrap_or_else(|| "results".to_string());
        println!("Connected: {folder}");
        return;
    }
    eprintln!("Connection failed: {} required file(s) missing", missing.len());
    for name in &missing {
        eprintln!("  missing: {name}");
    }
    process::exit(1);
}

/// Shared preamble of the data-bearing subcommands.
fn load_for_display(root: &Path, demo: bool) -> Bundle {
    let bundle = data::load_bundle(root, demo);
    if bundle.demo {
        println!("=== DEMO MODE: synthetic data, not real patients ===");
        println!();
    }
    bundle
}

fn run_summary(root: &Path, demo: bool) {
    let bundle = load_for_display(root, demo);
    if bundle.cases.is_empty() {
        println!("No data available. Pass --demo or check the results folder.");
        return;
    }

    let summary = aggregate::summarize(&bundle.cases);
    if let Some(config) = &bundle.run_config {
        if let Some(total) = config.n_patients() {
            if total as usize > summary.n_cases {
                println!(
                    "Note: {} explainability reports shown; the full run contains {total} patients.",
                    summary.n_cases
                );
                println!();
            }
        }
    }

    println!("Key metrics");
    println!("  Cases with reports   {}", summary.n_cases);
    println!(
        "  High risk            {:.1}%  ({} cases)",
        summary.pct_high_risk, summary.n_high_risk
    );
    println!("  Avg risk             {:.3}", summary.mean_probability);
    println!("  Avg uncertainty      {:.3}", summary.mean_uncertainty);
    println!("  Images available     {}", bundle.artifacts.case_image_count);
    println!(
        "  Class balance        {} disease / {} healthy",
        summary.n_disease, summary.n_healthy
    );

    println!();
    println!("Risk bands");
    for (band, count) in aggregate::band_distribution(&bundle.cases) {
        println!("  {:<9} {count}", band.to_string());
    }

    println!();
    println!("Artifacts");
    let flags = &bundle.artifacts;
    for (label, present) in [
        ("index.csv", flags.index_csv),
        ("case mapping", flags.case_mapping),
        ("case images", flags.case_images),
        ("metrics summary", flags.metrics_summary),
        ("run config", flags.run_config),
        ("calibration plots", flags.calibration_plots),
        ("ROC curves", flags.roc_curves),
        ("PR curves", flags.pr_curves),
        ("confusion matrix", flags.confusion_matrix),
    ] {
        let status = if present { "available" } else { "missing" };
        println!("  {label:<18} {status}");
    }

    if let Some(rows) = &bundle.metrics_summary {
        println!();
        println!("Model performance");
        println!(
            "  {:<16} {:>6} {:>7} {:>6} {:>6} {:>6} {:>6}",
            "model", "AUC", "PR-AUC", "Sens", "Spec", "Acc", "F1"
        );
        for row in rows {
            println!(
                "  {:<16} {:>6} {:>7} {:>6} {:>6} {:>6} {:>6}",
                row.model,
                fmt_metric(row.auc),
                fmt_metric(row.pr_auc),
                fmt_metric(row.sensitivity),
                fmt_metric(row.specificity),
                fmt_metric(row.accuracy),
                fmt_metric(row.f1),
            );
        }
    }

    if let Some(config) = &bundle.run_config {
        println!();
        println!("Run summary");
        let timestamp = config
            .timestamp()
            .map(|t| t.chars().take(10).collect::<String>());
        println!(
            "  Timestamp         {}",
            timestamp.unwrap_or_else(|| "N/A".to_string())
        );
        println!("  Patients          {}", config.display("n_patients"));
        println!("  Disease cases     {}", config.display("n_masld"));
        println!("  Healthy cases     {}", config.display("n_healthy"));
        println!("  Batch size        {}", config.display("batch_size"));
        println!("  CNN epochs        {}", config.display("cnn_epochs"));
        println!("  Learning rate     {}", config.display("cnn_lr"));
        println!("  Calibration bins  {}", config.display("calibration_bins"));
    }
}

fn run_cases(root: &Path, demo: bool, filters: &CaseFilterArgs) {
    let bundle = load_for_display(root, demo);
    if bundle.cases.is_empty() {
        println!("No data available. Pass --demo or check the results folder.");
        return;
    }

    let state = filters.to_filter_state();
    let filtered = filter::apply(&bundle.cases, &state);
    println!("Showing {} of {} cases", filtered.len(), bundle.cases.len());
    println!();
    print_case_table(&filtered);

    if let Some(n) = filters.top_risk {
        println!();
        println!("Top {n} highest-risk cases");
        for case in aggregate::top_n(&filtered, |c| c.p_calibrated, n) {
            println!(
                "  {:<14} {:<9} p={:.3}",
                case.case_id,
                case.risk_band.to_string(),
                case.p_calibrated
            );
        }
    }

    if let Some(n) = filters.top_uncertain {
        println!();
        println!("Top {n} most uncertain cases");
        for case in aggregate::top_n(&filtered, |c| c.uncertainty_std, n) {
            println!(
                "  {:<14} {:<9} std={:.3}",
                case.case_id,
                case.risk_band.to_string(),
                case.uncertainty_std
            );
        }
    }
}

fn print_case_table(cases: &[CaseRecord]) {
    println!(
        "{:<14} {:<9} {:>7} {:>7}  {:<8} {:>4}",
        "case", "band", "p_cal", "std", "class", "fold"
    );
    for case in cases {
        println!(
            "{:<14} {:<9} {:>7.3} {:>7.3}  {:<8} {:>4}",
            case.case_id,
            case.risk_band.to_string(),
            case.p_calibrated,
            case.uncertainty_std,
            case.y_true.to_string(),
            case.fold
        );
    }
}

fn run_case(root: &Path, demo: bool, case_id: &str) {
    let bundle = load_for_display(root, demo);
    let Some(case) = bundle.cases.iter().find(|c| c.case_id == case_id) else {
        eprintln!("Unknown case id '{case_id}'");
        process::exit(1);
    };

    println!("Case {}", case.case_id);
    println!("  Risk band     {}  ({})", case.risk_band, case.risk_band.color());
    println!("  Probability   {:.3}", case.p_calibrated);
    println!("  Uncertainty   {:.3}", case.uncertainty_std);
    println!("  Class         {}", case.y_true);
    println!("  Fold          {}", case.fold);

    match bundle.patient_for(case_id) {
        Some(patient) => println!("  Patient       {patient}"),
        None => println!("  Patient       N/A"),
    }

    if bundle.demo {
        println!("  Image         Missing (demo data has no images)");
    } else {
        match artifacts::image_path_for(root, case_id) {
            Some(path) => println!("  Image         {}", path.display()),
            None => println!("  Image         Missing"),
        }
    }
}

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "N/A".to_string(),
    }
}
