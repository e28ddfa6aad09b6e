//! Data acquisition and preparation stages.
//!
//! - dataset loading + text cleaning (`loader`)
//! - quality filtering with the 3-class post-condition (`filter`)
//! - deterministic train/test splitting (`split`)

pub mod filter;
pub mod loader;
pub mod split;

pub use filter::*;
pub use loader::*;
pub use split::*;
