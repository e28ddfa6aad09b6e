//! Evaluation: per-class metrics, slice reports, and formatted terminal output.
//!
//! We keep formatting code separate (`format`) so:
//! - the metric computation stays clean and testable
//! - output changes are localized

use tracing::debug;

use crate::domain::{ClassMetrics, EvaluationReport, Label};
use crate::error::AppError;

pub mod format;

pub use format::*;

/// Score predictions against held-out labels.
///
/// The two sequences must be aligned and non-empty.
pub fn evaluate(name: &str, truth: &[Label], predicted: &[Label]) -> Result<EvaluationReport, AppError> {
    if truth.len() != predicted.len() {
        return Err(AppError::data(format!(
            "Evaluation length mismatch: {} true labels vs {} predictions.",
            truth.len(),
            predicted.len()
        )));
    }
    if truth.is_empty() {
        return Err(AppError::data(format!(
            "No records to evaluate for '{name}'."
        )));
    }

    let mut per_class = Vec::with_capacity(Label::ALL.len());
    for label in Label::ALL {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t == label, p == label) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        per_class.push((
            label,
            ClassMetrics {
                precision,
                recall,
                f1,
                support: tp + fn_,
            },
        ));
    }

    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    let n = truth.len();

    debug!(name, n, accuracy = correct as f64 / n as f64, "evaluation done");
    Ok(EvaluationReport {
        name: name.to_string(),
        per_class,
        accuracy: correct as f64 / n as f64,
        n,
    })
}

/// Score predictions on the subset of records whose text matches a predicate.
///
/// Filters the three aligned sequences together, then evaluates the retained
/// subset. A slice matching zero records is an explicit no-data error; callers
/// that treat slices as diagnostics can downgrade it to a warning.
pub fn evaluate_slice<F>(
    name: &str,
    texts: &[String],
    truth: &[Label],
    predicted: &[Label],
    keep: F,
) -> Result<EvaluationReport, AppError>
where
    F: Fn(&str) -> bool,
{
    if texts.len() != truth.len() || texts.len() != predicted.len() {
        return Err(AppError::data(format!(
            "Slice '{name}': texts/labels/predictions are not aligned ({}/{}/{}).",
            texts.len(),
            truth.len(),
            predicted.len()
        )));
    }

    let mut sliced_truth = Vec::new();
    let mut sliced_predicted = Vec::new();
    for ((text, &t), &p) in texts.iter().zip(truth).zip(predicted) {
        if keep(text) {
            sliced_truth.push(t);
            sliced_predicted.push(p);
        }
    }

    if sliced_truth.is_empty() {
        return Err(AppError::data(format!("Slice '{name}' matched no records.")));
    }

    evaluate(name, &sliced_truth, &sliced_predicted)
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(seq: &[u8]) -> Vec<Label> {
        seq.iter().map(|&c| Label::from_code(c).unwrap()).collect()
    }

    #[test]
    fn perfect_predictions_score_one_everywhere() {
        let truth = labels(&[0, 1, 2, 0, 1, 2]);
        let report = evaluate("test set", &truth, &truth).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.n, 6);
        for (_, m) in &report.per_class {
            assert_eq!(m.precision, 1.0);
            assert_eq!(m.recall, 1.0);
            assert_eq!(m.f1, 1.0);
            assert_eq!(m.support, 2);
        }
    }

    #[test]
    fn metrics_count_confusions_per_class() {
        // truth:     neg neg neu pos
        // predicted: neg neu neu neu
        let truth = labels(&[0, 0, 1, 2]);
        let predicted = labels(&[0, 1, 1, 1]);
        let report = evaluate("test set", &truth, &predicted).unwrap();

        let (_, neg) = report.per_class[0];
        assert_eq!(neg.precision, 1.0);
        assert_eq!(neg.recall, 0.5);
        assert_eq!(neg.support, 2);

        let (_, neu) = report.per_class[1];
        assert!((neu.precision - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(neu.recall, 1.0);

        let (_, pos) = report.per_class[2];
        assert_eq!(pos.precision, 0.0);
        assert_eq!(pos.recall, 0.0);
        assert_eq!(pos.f1, 0.0);
        assert_eq!(report.accuracy, 0.5);
    }

    #[test]
    fn mismatched_lengths_are_fatal() {
        let truth = labels(&[0, 1]);
        let predicted = labels(&[0]);
        assert!(evaluate("test set", &truth, &predicted).is_err());
    }

    #[test]
    fn slice_filters_all_three_sequences_together() {
        let texts = vec![
            "strong quarter for the company".to_string(),
            "ceo resigned this week".to_string(),
            "weak quarter overall".to_string(),
        ];
        let truth = labels(&[2, 1, 0]);
        let predicted = labels(&[2, 0, 0]);

        let report =
            evaluate_slice("quarterly news", &texts, &truth, &predicted, |t| t.contains("quarter"))
                .unwrap();
        // Only rows 0 and 2 survive, both predicted correctly.
        assert_eq!(report.n, 2);
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn empty_slice_is_an_explicit_no_data_error() {
        let texts = vec!["nothing relevant here at all".to_string()];
        let truth = labels(&[1]);
        let predicted = labels(&[1]);
        let err = evaluate_slice("quarterly news", &texts, &truth, &predicted, |t| {
            t.contains("quarter")
        })
        .unwrap_err();
        assert!(err.message().contains("matched no records"));
    }
}
