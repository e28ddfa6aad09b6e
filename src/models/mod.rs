//! Classifier implementation.
//!
//! A single model family for now (multinomial naive Bayes), kept behind plain
//! fit/predict functions so the pipeline and the serving app stay generic.

pub mod nb;

pub use nb::*;
