//! Text feature extraction (TF-IDF term weighting).

pub mod tfidf;

pub use tfidf::*;
