//! Input/output helpers: exported artifact read/write.

pub mod artifacts;

pub use artifacts::*;
