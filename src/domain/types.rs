//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a pipeline run
//! - exported to JSON artifacts
//! - reloaded later by the serving process

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sentiment label for a financial sentence.
///
/// The numeric codes match the upstream dataset encoding
/// (0 = negative, 1 = neutral, 2 = positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Negative,
    Neutral,
    Positive,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Negative, Label::Neutral, Label::Positive];

    /// Decode the upstream dataset's integer label.
    pub fn from_code(code: u8) -> Option<Label> {
        match code {
            0 => Some(Label::Negative),
            1 => Some(Label::Neutral),
            2 => Some(Label::Positive),
            _ => None,
        }
    }

    /// Human-readable label for reports and the serving form.
    pub fn display_name(self) -> &'static str {
        match self {
            Label::Negative => "negative",
            Label::Neutral => "neutral",
            Label::Positive => "positive",
        }
    }
}

/// A single labeled sentence after load-time cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub text: String,
    pub label: Label,
}

impl Record {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Disjoint train/test partition of the filtered records.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Vec<Record>,
    pub test: Vec<Record>,
}

/// Per-class precision/recall/F1 with support.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Structured evaluation output over a (possibly sliced) test set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Which subset this report covers ("test set", "quarterly news", ...).
    pub name: String,
    pub per_class: Vec<(Label, ClassMetrics)>,
    pub accuracy: f64,
    /// Number of records evaluated.
    pub n: usize,
}

/// One perturbation diagnostic: a paraphrase and whether the prediction moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerturbationCase {
    pub original: String,
    pub paraphrase: String,
    pub original_label: Label,
    pub new_label: Label,
}

impl PerturbationCase {
    /// Did the paraphrase change the predicted label?
    pub fn flipped(&self) -> bool {
        self.original_label != self.new_label
    }
}

/// Where the pipeline reads labeled sentences from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Hugging Face datasets-server HTTP API (default).
    Remote,
    /// Local JSON file: an array of `{"sentence": ..., "label": 0|1|2}`.
    LocalJson(PathBuf),
}

/// A full training run's configuration, derived from CLI flags plus defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: DataSource,
    /// Seed shared by the splitter and the perturbation sampler.
    pub seed: u64,
    /// Fraction of filtered records held out for testing.
    pub test_ratio: f64,
    /// Directory receiving the exported artifact pair.
    pub out_dir: PathBuf,
    /// How many test sentences to paraphrase in the perturbation stage.
    pub perturb_samples: usize,
    /// Skip the perturbation stage entirely (no network call).
    pub skip_perturb: bool,
    /// Company name used for the company slice report.
    pub slice_company: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_codes_round_trip() {
        for (code, label) in [(0u8, Label::Negative), (1, Label::Neutral), (2, Label::Positive)] {
            assert_eq!(Label::from_code(code), Some(label));
        }
        assert_eq!(Label::from_code(3), None);
    }

    #[test]
    fn flip_flag_reflects_label_change() {
        let case = PerturbationCase {
            original: "profit rose".into(),
            paraphrase: "profits went up".into(),
            original_label: Label::Positive,
            new_label: Label::Neutral,
        };
        assert!(case.flipped());
    }
}
