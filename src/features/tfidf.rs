//! TF-IDF vectorizer fitted on train text only.
//!
//! The leakage contract lives in the types: [`FeatureSpace::fit`] is the only
//! constructor, and [`FeatureSpace::transform`] takes `&self`, so applying the
//! space to test text cannot change the fitted vocabulary or IDF weights.
//!
//! Weighting follows the common smoothed scheme:
//!
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! - document vectors are raw term counts scaled by IDF, then L2-normalized
//!
//! Tokens are word-like runs of alphanumerics, at least 2 characters, with a
//! small English stop-word list removed. Documents must already be cleaned
//! (lower-case, no punctuation); both the loader and the serving form apply
//! [`crate::data::clean_sentence`] before handing text to this module.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A sparse document vector: `(term index, weight)` sorted by index.
pub type SparseVec = Vec<(usize, f64)>;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had", "has",
    "have", "he", "her", "his", "if", "in", "is", "it", "its", "no", "not", "of", "on", "or",
    "she", "that", "the", "their", "them", "they", "this", "to", "was", "were", "which", "will",
    "with",
];

/// A fitted term-weighting transform mapping text to numeric vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpace {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl FeatureSpace {
    /// Fit the vocabulary and IDF weights on training documents only.
    pub fn fit(train_texts: &[String]) -> Result<FeatureSpace, AppError> {
        if train_texts.is_empty() {
            return Err(AppError::data("Cannot fit a feature space on zero documents."));
        }

        // Document frequency per term.
        let mut df: HashMap<String, usize> = HashMap::new();
        for text in train_texts {
            let mut seen: Vec<&str> = tokenize(text).collect();
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *df.entry(token.to_string()).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            return Err(AppError::data(
                "Training documents produced an empty vocabulary.",
            ));
        }

        // Sort terms for a deterministic index assignment.
        let mut terms: Vec<(String, usize)> = df.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let n = train_texts.len() as f64;
        let mut vocab = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, (term, count)) in terms.into_iter().enumerate() {
            vocab.insert(term, index);
            idf.push(((1.0 + n) / (1.0 + count as f64)).ln() + 1.0);
        }

        Ok(FeatureSpace { vocab, idf })
    }

    /// Vectorize a batch of documents. Never refits; unknown terms are ignored.
    pub fn transform(&self, texts: &[String]) -> Vec<SparseVec> {
        texts.par_iter().map(|t| self.vectorize(t)).collect()
    }

    /// Vectorize a single document.
    pub fn vectorize(&self, text: &str) -> SparseVec {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&index) = self.vocab.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVec = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();
        row.sort_unstable_by_key(|&(index, _)| index);

        // L2-normalize so document length does not dominate.
        let norm = row.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }
        row
    }

    /// Number of terms in the fitted vocabulary.
    pub fn vocab_len(&self) -> usize {
        self.idf.len()
    }

    /// The fitted IDF weights, indexed by term index.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
}
