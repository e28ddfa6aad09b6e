//! `finsent` library crate.
//!
//! The binary (`finsent`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the training pipeline and the serving app share domain types
//! - modules stay easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod perturb;
pub mod report;
pub mod serve;
