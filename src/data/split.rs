//! Deterministic train/test splitting.
//!
//! Reproducibility contract: identical input + seed produces the identical
//! partition. Stratification is not guaranteed; the 3-class check happens
//! earlier in the filter stage.

use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::info;

use crate::domain::{Record, Split};
use crate::error::AppError;

/// Partition records into disjoint train/test subsets.
///
/// `test_ratio` is the fraction held out for testing (default 0.2 upstream).
pub fn train_test_split(records: Vec<Record>, test_ratio: f64, seed: u64) -> Result<Split, AppError> {
    if !(test_ratio.is_finite() && test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(AppError::config(format!(
            "Test ratio must be in (0, 1), got {test_ratio}."
        )));
    }
    let n = records.len();
    if n < 2 {
        return Err(AppError::data(format!(
            "Need at least 2 records to split, got {n}."
        )));
    }

    let n_test = ((n as f64) * test_ratio).round().clamp(1.0, (n - 1) as f64) as usize;

    let mut shuffled = records;
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let train = shuffled.split_off(n_test);
    let test = shuffled;

    info!(n_train = train.len(), n_test = test.len(), seed, "train/test split done");
    Ok(Split { train, test })
}
