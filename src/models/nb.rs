//! Multinomial naive Bayes over TF-IDF weights.
//!
//! Parameters are estimated once in [`SentimentModel::fit`] and never change
//! afterwards; prediction takes `&self`. Lidstone smoothing keeps unseen
//! class/term pairs from producing `ln(0)`.
//!
//! The class axis is indexed in [`Label::ALL`] order so the model file and the
//! in-memory layout always agree.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::Label;
use crate::error::AppError;
use crate::features::SparseVec;

/// Default Lidstone smoothing constant.
pub const DEFAULT_ALPHA: f64 = 1.0;

/// A fitted classifier mapping a feature vector to a sentiment label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentModel {
    /// `ln P(class)`, indexed by `Label::ALL` order.
    log_prior: DVector<f64>,
    /// `ln P(term | class)`, one row per class, one column per term.
    feature_log_prob: DMatrix<f64>,
}

impl SentimentModel {
    /// Fit the classifier on train features and labels.
    ///
    /// `n_features` must match the vocabulary size of the feature space that
    /// produced `rows`; a row referencing an out-of-range term index is a
    /// fatal shape mismatch.
    pub fn fit(
        rows: &[SparseVec],
        labels: &[Label],
        n_features: usize,
        alpha: f64,
    ) -> Result<SentimentModel, AppError> {
        if rows.len() != labels.len() {
            return Err(AppError::data(format!(
                "Feature/label length mismatch: {} rows vs {} labels.",
                rows.len(),
                labels.len()
            )));
        }
        if rows.is_empty() {
            return Err(AppError::data("Cannot train on zero examples."));
        }
        if n_features == 0 {
            return Err(AppError::data("Cannot train with an empty feature space."));
        }
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(AppError::config(format!(
                "Smoothing alpha must be finite and > 0, got {alpha}."
            )));
        }

        let n_classes = Label::ALL.len();
        let mut term_weight = DMatrix::<f64>::zeros(n_classes, n_features);
        let mut doc_count = vec![0usize; n_classes];

        for (row, &label) in rows.iter().zip(labels) {
            let class = label as usize;
            doc_count[class] += 1;
            for &(index, weight) in row {
                if index >= n_features {
                    return Err(AppError::data(format!(
                        "Term index {index} out of range for {n_features} features."
                    )));
                }
                term_weight[(class, index)] += weight;
            }
        }

        for (class, &count) in doc_count.iter().enumerate() {
            if count == 0 {
                return Err(AppError::data(format!(
                    "No training examples for label '{}'.",
                    Label::ALL[class].display_name()
                )));
            }
        }

        let n_docs = rows.len() as f64;
        let log_prior =
            DVector::from_iterator(n_classes, doc_count.iter().map(|&c| (c as f64 / n_docs).ln()));

        let mut feature_log_prob = DMatrix::<f64>::zeros(n_classes, n_features);
        for class in 0..n_classes {
            let class_total: f64 = term_weight.row(class).sum();
            let denom = class_total + alpha * n_features as f64;
            for index in 0..n_features {
                feature_log_prob[(class, index)] =
                    ((term_weight[(class, index)] + alpha) / denom).ln();
            }
        }

        Ok(SentimentModel {
            log_prior,
            feature_log_prob,
        })
    }

    /// Predict the label for a single feature vector.
    ///
    /// Out-of-range indices are ignored at prediction time; they can only come
    /// from a feature space other than the one this model was trained with,
    /// and the artifact pairing check guards that path.
    pub fn predict(&self, row: &SparseVec) -> Label {
        let mut scores = self.log_prior.clone();
        for &(index, weight) in row {
            if index >= self.n_features() {
                continue;
            }
            for class in 0..Label::ALL.len() {
                scores[class] += weight * self.feature_log_prob[(class, index)];
            }
        }

        let mut best = 0usize;
        for class in 1..Label::ALL.len() {
            if scores[class] > scores[best] {
                best = class;
            }
        }
        Label::ALL[best]
    }

    /// Predict labels for a batch of feature vectors.
    pub fn predict_many(&self, rows: &[SparseVec]) -> Vec<Label> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Vocabulary size this model was trained against.
    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }
}
