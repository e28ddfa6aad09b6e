//! Perturbation testing via back-translation.
//!
//! A meaning-preserving paraphrase is produced by translating a sentence to a
//! pivot language and back. The paraphrase source is a trait so the pipeline
//! can be tested without a network, and so the translation provider can be
//! swapped out.
//!
//! This stage is purely diagnostic: it re-predicts on the paraphrases and
//! flags label flips with a warning. It never touches the model or the
//! feature space, and the pipeline runs it *after* artifact export so a dead
//! translation endpoint cannot block a release.

use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::data::clean_sentence;
use crate::domain::{Label, PerturbationCase};
use crate::error::AppError;
use crate::features::FeatureSpace;
use crate::models::SentimentModel;

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Default pivot language for back-translation.
pub const DEFAULT_PIVOT: &str = "zh-CN";

/// An opaque generator of meaning-preserving rewrites.
pub trait ParaphraseSource {
    fn paraphrase(&self, text: &str) -> Result<String, AppError>;
}

/// Back-translation through a public translation endpoint.
pub struct BackTranslator {
    client: Client,
    pivot: String,
}

impl BackTranslator {
    pub fn new(pivot: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            pivot: pivot.into(),
        }
    }

    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, AppError> {
        let resp = self
            .client
            .get(TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", from),
                ("tl", to),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| AppError::external(format!("Translation request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::external(format!(
                "Translation request failed with status {}.",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .map_err(|e| AppError::external(format!("Failed to parse translation response: {e}")))?;

        // Response shape: [[["chunk", "original", ...], ...], ...]
        let segments = body
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| AppError::external("Unexpected translation response shape."))?;

        let mut out = String::new();
        for segment in segments {
            if let Some(chunk) = segment.get(0).and_then(|v| v.as_str()) {
                out.push_str(chunk);
            }
        }

        if out.is_empty() {
            return Err(AppError::external("Translation returned an empty result."));
        }
        Ok(out)
    }
}

impl ParaphraseSource for BackTranslator {
    fn paraphrase(&self, text: &str) -> Result<String, AppError> {
        let pivoted = self.translate(text, "en", &self.pivot)?;
        self.translate(&pivoted, &self.pivot, "en")
    }
}

/// Paraphrase a seeded random sample of test sentences and check label stability.
///
/// `texts` and `predicted` are the aligned test sentences and their model
/// predictions. Returns one [`PerturbationCase`] per sampled sentence.
pub fn run_perturbation_tests(
    source: &dyn ParaphraseSource,
    space: &FeatureSpace,
    model: &SentimentModel,
    texts: &[String],
    predicted: &[Label],
    k: usize,
    seed: u64,
) -> Result<Vec<PerturbationCase>, AppError> {
    if texts.len() != predicted.len() {
        return Err(AppError::data(format!(
            "Perturbation inputs are not aligned: {} texts vs {} predictions.",
            texts.len(),
            predicted.len()
        )));
    }

    let k = k.min(texts.len());
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let indices = rand::seq::index::sample(&mut rng, texts.len(), k);

    let mut cases = Vec::with_capacity(k);
    for index in indices {
        let original = &texts[index];
        let paraphrase = source.paraphrase(original)?;

        let row = space.vectorize(&clean_sentence(&paraphrase));
        let new_label = model.predict(&row);
        let case = PerturbationCase {
            original: original.clone(),
            paraphrase,
            original_label: predicted[index],
            new_label,
        };

        if case.flipped() {
            warn!(
                original = %case.original,
                paraphrase = %case.paraphrase,
                was = case.original_label.display_name(),
                now = case.new_label.display_name(),
                "label changed after perturbation"
            );
        }
        cases.push(case);
    }

    info!(
        sampled = cases.len(),
        flipped = cases.iter().filter(|c| c.flipped()).count(),
        "perturbation tests done"
    );
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSpace;
    use crate::models::{SentimentModel, DEFAULT_ALPHA};

    /// Stub source that echoes the input, optionally rewritten.
    struct FixedSource {
        rewrite: Option<String>,
    }

    impl ParaphraseSource for FixedSource {
        fn paraphrase(&self, text: &str) -> Result<String, AppError> {
            Ok(self.rewrite.clone().unwrap_or_else(|| text.to_string()))
        }
    }

    struct FailingSource;

    impl ParaphraseSource for FailingSource {
        fn paraphrase(&self, _text: &str) -> Result<String, AppError> {
            Err(AppError::external("translation endpoint unreachable"))
        }
    }

    fn fitted() -> (FeatureSpace, SentimentModel, Vec<String>, Vec<Label>) {
        let texts = vec![
            "profit rose sharply beating estimates".to_string(),
            "profit fell sharply missing estimates".to_string(),
            "company operates in helsinki finland".to_string(),
        ];
        let labels = vec![Label::Positive, Label::Negative, Label::Neutral];
        let space = FeatureSpace::fit(&texts).unwrap();
        let rows = space.transform(&texts);
        let model = SentimentModel::fit(&rows, &labels, space.vocab_len(), DEFAULT_ALPHA).unwrap();
        let predicted = model.predict_many(&rows);
        (space, model, texts, predicted)
    }

    #[test]
    fn identity_paraphrase_never_flips() {
        let (space, model, texts, predicted) = fitted();
        let source = FixedSource { rewrite: None };
        let cases =
            run_perturbation_tests(&source, &space, &model, &texts, &predicted, 2, 42).unwrap();
        assert_eq!(cases.len(), 2);
        assert!(cases.iter().all(|c| !c.flipped()));
    }

    #[test]
    fn adversarial_paraphrase_sets_the_flip_flag() {
        let (space, model, texts, predicted) = fitted();
        let source = FixedSource {
            rewrite: Some("profit fell sharply missing estimates".to_string()),
        };
        let cases =
            run_perturbation_tests(&source, &space, &model, &texts, &predicted, 3, 42).unwrap();
        // Every case is rewritten to a clearly negative sentence.
        assert!(cases
            .iter()
            .all(|c| c.new_label == Label::Negative));
        assert!(cases.iter().any(|c| c.flipped()));
    }

    #[test]
    fn sampling_is_deterministic_for_a_fixed_seed() {
        let (space, model, texts, predicted) = fitted();
        let source = FixedSource { rewrite: None };
        let a = run_perturbation_tests(&source, &space, &model, &texts, &predicted, 2, 7).unwrap();
        let b = run_perturbation_tests(&source, &space, &model, &texts, &predicted, 2, 7).unwrap();
        let originals = |cases: &[PerturbationCase]| {
            cases.iter().map(|c| c.original.clone()).collect::<Vec<_>>()
        };
        assert_eq!(originals(&a), originals(&b));
    }

    #[test]
    fn source_failure_propagates_without_partial_output() {
        let (space, model, texts, predicted) = fitted();
        let err = run_perturbation_tests(&FailingSource, &space, &model, &texts, &predicted, 2, 42)
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
