//! Domain types used throughout the pipeline and the serving app.
//!
//! This module defines:
//!
//! - labeled records and the 3-class sentiment label
//! - train/test splits
//! - evaluation reports (full set and slices)
//! - perturbation diagnostics
//! - the training run configuration

pub mod types;

pub use types::*;
