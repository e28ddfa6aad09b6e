//! Read/write the exported artifact pair.
//!
//! A training run exports two independent JSON files to a configured
//! directory: the fitted feature space and the trained model. The serving
//! process loads them together and assumes they came from the same run, so
//! both files carry the run id that produced them and the loader refuses a
//! mismatched pair.

use std::fs::{self, File};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::features::FeatureSpace;
use crate::models::SentimentModel;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const MODEL_FILE: &str = "model.json";

/// Envelope written around each exported payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile<T> {
    pub tool: String,
    /// Shared by both files of a pair; checked on load.
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub data: T,
}

/// The loaded feature-space/model pairing used by the serving process.
#[derive(Debug, Clone)]
pub struct ArtifactPair {
    pub run_id: Uuid,
    pub feature_space: FeatureSpace,
    pub model: SentimentModel,
}

/// Write the fitted feature space and model as a paired export.
///
/// Returns the generated run id stamped into both files.
pub fn export_artifacts(
    dir: &Path,
    feature_space: &FeatureSpace,
    model: &SentimentModel,
) -> Result<Uuid, AppError> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::config(format!(
            "Failed to create artifact directory '{}': {e}",
            dir.display()
        ))
    })?;

    let run_id = Uuid::new_v4();
    let created_at = Utc::now();

    write_artifact(&dir.join(VECTORIZER_FILE), run_id, created_at, feature_space)?;
    write_artifact(&dir.join(MODEL_FILE), run_id, created_at, model)?;

    info!(%run_id, dir = %dir.display(), "exported artifact pair");
    Ok(run_id)
}

/// Load the artifact pair, verifying the run ids match.
pub fn load_artifacts(dir: &Path) -> Result<ArtifactPair, AppError> {
    let vectorizer: ArtifactFile<FeatureSpace> = read_artifact(&dir.join(VECTORIZER_FILE))?;
    let model: ArtifactFile<SentimentModel> = read_artifact(&dir.join(MODEL_FILE))?;

    if vectorizer.run_id != model.run_id {
        return Err(AppError::config(format!(
            "Artifact pair mismatch in '{}': vectorizer is from run {}, model from run {}.",
            dir.display(),
            vectorizer.run_id,
            model.run_id
        )));
    }
    if vectorizer.data.vocab_len() != model.data.n_features() {
        return Err(AppError::config(format!(
            "Artifact pair mismatch in '{}': {} vocabulary terms vs {} model features.",
            dir.display(),
            vectorizer.data.vocab_len(),
            model.data.n_features()
        )));
    }

    Ok(ArtifactPair {
        run_id: model.run_id,
        feature_space: vectorizer.data,
        model: model.data,
    })
}

fn write_artifact<T: Serialize>(
    path: &Path,
    run_id: Uuid,
    created_at: DateTime<Utc>,
    data: &T,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!("Failed to create artifact '{}': {e}", path.display()))
    })?;
    let envelope = ArtifactFile {
        tool: "finsent".to_string(),
        run_id,
        created_at,
        data,
    };
    serde_json::to_writer_pretty(file, &envelope)
        .map_err(|e| AppError::config(format!("Failed to write artifact '{}': {e}", path.display())))
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<ArtifactFile<T>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Failed to open artifact '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid artifact '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Label;
    use crate::models::DEFAULT_ALPHA;
    use std::env;

    fn fitted_pair() -> (FeatureSpace, SentimentModel) {
        let texts = vec![
            "profit rose sharply beating estimates".to_string(),
            "profit fell sharply missing estimates".to_string(),
            "company operates in helsinki finland".to_string(),
        ];
        let labels = vec![Label::Positive, Label::Negative, Label::Neutral];
        let space = FeatureSpace::fit(&texts).unwrap();
        let rows = space.transform(&texts);
        let model = SentimentModel::fit(&rows, &labels, space.vocab_len(), DEFAULT_ALPHA).unwrap();
        (space, model)
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = env::temp_dir().join(format!("finsent-artifacts-{tag}-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn export_then_load_round_trips_the_pair() {
        let (space, model) = fitted_pair();
        let dir = temp_dir("roundtrip");

        let run_id = export_artifacts(&dir, &space, &model).unwrap();
        let pair = load_artifacts(&dir).unwrap();

        assert_eq!(pair.run_id, run_id);
        assert_eq!(pair.feature_space.vocab_len(), space.vocab_len());

        let row = pair.feature_space.vectorize("profit rose sharply");
        assert_eq!(pair.model.predict(&row), Label::Positive);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn mismatched_run_ids_are_rejected() {
        let (space, model) = fitted_pair();
        let dir_a = temp_dir("pair-a");
        let dir_b = temp_dir("pair-b");

        export_artifacts(&dir_a, &space, &model).unwrap();
        export_artifacts(&dir_b, &space, &model).unwrap();

        // Mix the vectorizer from one run with the model from another.
        fs::copy(dir_b.join(MODEL_FILE), dir_a.join(MODEL_FILE)).unwrap();
        let err = load_artifacts(&dir_a).unwrap_err();
        assert!(err.message().contains("mismatch"));

        fs::remove_dir_all(&dir_a).ok();
        fs::remove_dir_all(&dir_b).ok();
    }

    #[test]
    fn missing_files_give_a_clear_error() {
        let dir = temp_dir("missing");
        let err = load_artifacts(&dir).unwrap_err();
        assert!(err.message().contains(VECTORIZER_FILE));
        fs::remove_dir_all(&dir).ok();
    }
}
