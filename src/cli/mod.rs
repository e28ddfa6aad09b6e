//! Command-line parsing for the sentiment pipeline and serving app.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline/modeling code.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "finsent", version, about = "Financial news sentiment pipeline and serving app")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the training pipeline end to end and export the artifact pair.
    Train(TrainArgs),
    /// Serve the web form and regression endpoints from exported artifacts.
    Serve(ServeArgs),
}

/// Options for a training run.
#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Load records from a local JSON file instead of the dataset API.
    #[arg(long, value_name = "JSON")]
    pub input: Option<PathBuf>,

    /// Random seed for the train/test split and perturbation sampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of filtered records held out for testing.
    #[arg(long, default_value_t = 0.2)]
    pub test_ratio: f64,

    /// Directory receiving the exported vectorizer and model files.
    #[arg(long, default_value = "artifacts")]
    pub out: PathBuf,

    /// Number of test sentences to paraphrase in the perturbation stage.
    #[arg(long, default_value_t = 2)]
    pub perturb_samples: usize,

    /// Skip the perturbation stage entirely (no translation calls).
    #[arg(long)]
    pub skip_perturb: bool,

    /// Company name used for the company slice report.
    #[arg(long, default_value = "comptel")]
    pub slice_company: String,
}

/// Options for the serving app.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,

    /// Directory containing the exported artifact pair.
    #[arg(long, default_value = "artifacts")]
    pub artifacts: PathBuf,
}
