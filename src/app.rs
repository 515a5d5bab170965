//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads configuration
//! - installs logging
//! - loads the model + schema artifacts
//! - dispatches to the form, one-shot/batch prediction, training or sampling

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{BatchArgs, Command, PredictArgs, SampleArgs, TrainArgs, TuiArgs};
use crate::config::AppConfig;
use crate::domain::SessionState;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

use pipeline::Engine;

/// Entry point for the `hpp` binary.
pub fn run() -> Result<(), AppError> {
    // We want `hpp` and `hpp --model m.json` to behave like `hpp tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = AppConfig::from_env()?.with_overrides(cli.model, cli.schema);

    match cli.command {
        Command::Tui(args) => handle_tui(&config, args),
        Command::Predict(args) => handle_predict(&config, args),
        Command::Batch(args) => handle_batch(&config, args),
        Command::Train(args) => handle_train(&config, args),
        Command::Sample(args) => handle_sample(&config, args),
    }
}

fn handle_tui(config: &AppConfig, args: TuiArgs) -> Result<(), AppError> {
    let log_file = args.log_file.clone().unwrap_or_else(|| config.log_file.clone());
    crate::logging::init(&config.log_filter, LogTarget::File(&log_file))?;

    // Artifacts are loaded before the terminal is taken over, so a bad model
    // fails with a readable message instead of a blank screen.
    let engine = Engine::load(config)?;
    let start = args.location.resolve(config.start_coordinate);
    if !start.is_valid() {
        return Err(AppError::new(2, format!("Start location out of range: {start:?}.")));
    }

    info!(model_id = engine.model_id(), "starting form");
    crate::tui::run(&engine, start, PathBuf::from("debug"))
}

fn handle_predict(config: &AppConfig, args: PredictArgs) -> Result<(), AppError> {
    crate::logging::init(&config.log_filter, LogTarget::Stderr)?;
    let engine = Engine::load(config)?;

    let coordinate = args.location.resolve(config.start_coordinate);
    if !coordinate.is_valid() {
        return Err(AppError::new(2, format!("Location out of range: {coordinate:?}.")));
    }
    let session = SessionState::new(coordinate);

    let outcome = engine.predict_once(&args.inputs(), &session)?;
    print!("{}", crate::report::format_prediction_summary(&outcome, args.show_row));
    Ok(())
}

fn handle_batch(config: &AppConfig, args: BatchArgs) -> Result<(), AppError> {
    crate::logging::init(&config.log_filter, LogTarget::Stderr)?;
    let engine = Engine::load(config)?;

    // The training target may still be in the file; it is not a feature.
    let data = crate::io::ingest::load_features(&args.input, engine.target())?;
    for e in &data.row_errors {
        warn!(line = e.line, "{}", e.message);
    }
    if data.rows.is_empty() {
        return Err(AppError::new(3, format!("No usable rows in '{}'.", args.input.display())));
    }

    let predictions = engine.predict_batch(&data.rows);
    let failed = predictions.iter().filter(|p| p.price.is_err()).count();
    info!(rows = predictions.len(), failed, "batch predicted");

    match &args.out {
        Some(path) => {
            crate::io::export::write_predictions_csv(path, &predictions)?;
            print!("{}", crate::report::format_batch_totals(&predictions));
            println!("Wrote {}", path.display());
        }
        None => print!("{}", crate::report::format_batch(&predictions)),
    }
    Ok(())
}

fn handle_train(config: &AppConfig, args: TrainArgs) -> Result<(), AppError> {
    crate::logging::init(&config.log_filter, LogTarget::Stderr)?;

    let data = crate::io::ingest::load_records(&args.data, Some(&args.target))?;
    for e in &data.row_errors {
        warn!(line = e.line, "{}", e.message);
    }

    let output = crate::train::train_model(&data, &args.target, &args.model_id)?;

    let model_path = args.model_out.clone().unwrap_or_else(|| config.model_path.clone());
    let schema_path = args.schema_out.clone().unwrap_or_else(|| config.schema_path.clone());
    crate::io::artifacts::write_schema(&schema_path, &output.schema)?;
    crate::io::artifacts::write_model(&model_path, &output.model)?;

    print!("{}", crate::report::format_training_summary(&data, &output));
    println!("\nWrote {} and {}", model_path.display(), schema_path.display());
    Ok(())
}

fn handle_sample(config: &AppConfig, args: SampleArgs) -> Result<(), AppError> {
    crate::logging::init(&config.log_filter, LogTarget::Stderr)?;

    let sample_config = crate::data::SampleConfig {
        count: args.count,
        seed: args.seed,
        noise_sd: args.noise,
    };
    let houses = crate::data::generate_sample(&sample_config)?;
    crate::data::write_sample_csv(&args.out, &houses)?;
    println!("Wrote {} houses to {}", houses.len(), args.out.display());
    Ok(())
}

/// Rewrite argv so `hpp` defaults to `hpp tui`.
///
/// Rules:
/// - `hpp`                      -> `hpp tui`
/// - `hpp --lat 51.5 ...`       -> `hpp tui --lat 51.5 ...`
/// - `hpp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "batch" | "train" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
