//! The sequential training pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> filter -> split -> extract -> train -> evaluate -> export -> perturb
//!
//! Each stage consumes the previous stage's output and produces a new value;
//! nothing is mutated in place. Export deliberately runs *before* the
//! perturbation diagnostics so an unreachable translation endpoint cannot
//! block the release of a trained artifact, and a perturbation failure only
//! downgrades to a warning.

use tracing::{info, warn};
use uuid::Uuid;

use crate::data::{load_local_json, quality_filter, train_test_split, DatasetClient};
use crate::domain::{DataSource, EvaluationReport, Label, PerturbationCase, PipelineConfig};
use crate::error::AppError;
use crate::features::FeatureSpace;
use crate::io::export_artifacts;
use crate::models::{SentimentModel, DEFAULT_ALPHA};
use crate::perturb::{run_perturbation_tests, BackTranslator, DEFAULT_PIVOT};
use crate::report::{evaluate, evaluate_slice};

/// Keyword defining the quarterly-news slice.
const QUARTER_KEYWORD: &str = "quarter";

/// All computed outputs of a single training run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Full-test-set evaluation.
    pub report: EvaluationReport,
    /// Slice evaluations that produced data (empty slices are skipped).
    pub slice_reports: Vec<EvaluationReport>,
    /// Perturbation diagnostics (empty when skipped or failed).
    pub perturbations: Vec<PerturbationCase>,
    /// Run id stamped into the exported artifact pair.
    pub run_id: Uuid,
    pub n_train: usize,
    pub n_test: usize,
}

/// Execute the full training pipeline and return the computed outputs.
pub fn run_training(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    // 1) Load and clean the labeled sentences.
    let raw = match &config.source {
        DataSource::Remote => DatasetClient::new().fetch_all()?,
        DataSource::LocalJson(path) => load_local_json(path)?,
    };

    // 2) Drop degenerate records; assert the 3-class post-condition.
    let filtered = quality_filter(raw)?;

    // 3) Deterministic train/test partition.
    let split = train_test_split(filtered, config.test_ratio, config.seed)?;
    let (train_texts, train_labels): (Vec<String>, Vec<Label>) =
        split.train.iter().map(|r| (r.text.clone(), r.label)).unzip();
    let (test_texts, test_labels): (Vec<String>, Vec<Label>) =
        split.test.iter().map(|r| (r.text.clone(), r.label)).unzip();

    // 4) Fit the feature space on train text only, then apply it to both sides.
    let space = FeatureSpace::fit(&train_texts)?;
    let train_rows = space.transform(&train_texts);
    let test_rows = space.transform(&test_texts);
    info!(vocab = space.vocab_len(), "feature space fitted");

    // 5) Train the classifier.
    let model = SentimentModel::fit(&train_rows, &train_labels, space.vocab_len(), DEFAULT_ALPHA)?;

    // 6) Evaluate on the held-out set, then on the named slices.
    let predicted = model.predict_many(&test_rows);
    let report = evaluate("test set", &test_labels, &predicted)?;

    let mut slice_reports = Vec::new();
    let quarterly = evaluate_slice("quarterly news", &test_texts, &test_labels, &predicted, |t| {
        t.contains(QUARTER_KEYWORD)
    });
    let company_name = config.slice_company.as_str();
    let company = evaluate_slice(
        &format!("mentions of {company_name}"),
        &test_texts,
        &test_labels,
        &predicted,
        |t| t.contains(company_name),
    );
    for result in [quarterly, company] {
        match result {
            Ok(slice_report) => slice_reports.push(slice_report),
            Err(err) => warn!(%err, "skipping slice report"),
        }
    }

    // 7) Export the artifact pair. This runs before the perturbation stage so
    //    diagnostics can never block a release.
    let run_id = export_artifacts(&config.out_dir, &space, &model)?;

    // 8) Perturbation diagnostics; failures are non-fatal.
    let perturbations = if config.skip_perturb {
        Vec::new()
    } else {
        let translator = BackTranslator::new(DEFAULT_PIVOT);
        match run_perturbation_tests(
            &translator,
            &space,
            &model,
            &test_texts,
            &predicted,
            config.perturb_samples,
            config.seed,
        ) {
            Ok(cases) => cases,
            Err(err) => {
                warn!(%err, "perturbation stage failed; artifacts were already exported");
                Vec::new()
            }
        }
    };

    Ok(RunOutput {
        report,
        slice_reports,
        perturbations,
        run_id,
        n_train: train_texts.len(),
        n_test: test_texts.len(),
    })
}
