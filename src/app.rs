//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the training pipeline and prints its reports
//! - or starts the serving app

use clap::Parser;

use crate::cli::{Command, ServeArgs, TrainArgs};
use crate::domain::{DataSource, PipelineConfig};
use crate::error::AppError;
use crate::serve::ServeConfig;

pub mod pipeline;

/// Entry point for the `finsent` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Serve(args) => handle_serve(args),
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args);
    let run = pipeline::run_training(&config)?;

    println!("{}", crate::report::format_report(&run.report));
    for report in &run.slice_reports {
        println!("{}", crate::report::format_report(report));
    }
    println!("{}", crate::report::format_perturbations(&run.perturbations));
    println!(
        "Artifacts for run {} written to '{}'.",
        run.run_id,
        config.out_dir.display()
    );

    Ok(())
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    crate::serve::run(&ServeConfig {
        addr: args.addr,
        artifacts_dir: args.artifacts,
    })
}

pub fn pipeline_config_from_args(args: &TrainArgs) -> PipelineConfig {
    PipelineConfig {
        source: match &args.input {
            Some(path) => DataSource::LocalJson(path.clone()),
            None => DataSource::Remote,
        },
        seed: args.seed,
        test_ratio: args.test_ratio,
        out_dir: args.out.clone(),
        perturb_samples: args.perturb_samples,
        skip_perturb: args.skip_perturb,
        slice_company: args.slice_company.clone(),
    }
}
