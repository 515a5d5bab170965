//! Command-line parsing for the house price predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Coordinate, HouseInputs, HouseStyle, LotConfig, MsZoning};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hpp", version, about = "House price predictor (terminal form + map)")]
pub struct Cli {
    /// Model artifact (JSON). Overrides HPP_MODEL_PATH.
    #[arg(long, global = true, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Schema artifact (JSON). Overrides HPP_SCHEMA_PATH.
    #[arg(long, global = true, value_name = "JSON")]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default when no subcommand is given).
    Tui(TuiArgs),
    /// Predict one house from flags and print the price.
    Predict(PredictArgs),
    /// Predict every row of a CSV file.
    Batch(BatchArgs),
    /// Fit a model on a CSV and write the model + schema artifacts.
    Train(TrainArgs),
    /// Write a synthetic training CSV.
    Sample(SampleArgs),
}

/// Starting map location. Falls back to HPP_DEFAULT_LAT / HPP_DEFAULT_LNG.
#[derive(Debug, Args, Clone, Default)]
pub struct LocationArgs {
    /// Latitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,
}

impl LocationArgs {
    pub fn resolve(&self, fallback: Coordinate) -> Coordinate {
        Coordinate::new(
            self.lat.unwrap_or(fallback.latitude),
            self.lng.unwrap_or(fallback.longitude),
        )
    }
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Log file (the terminal is owned by the UI). Overrides HPP_LOG_FILE.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Overall material and finish quality (1-10).
    #[arg(long, default_value_t = 5.0)]
    pub overall_qual: f64,

    /// Above ground living area (sqft).
    #[arg(long, default_value_t = 1500.0)]
    pub gr_liv_area: f64,

    /// Total basement area (sqft).
    #[arg(long, default_value_t = 1000.0)]
    pub total_bsmt_sf: f64,

    /// Garage capacity in cars (0-4).
    #[arg(long, default_value_t = 2.0)]
    pub garage_cars: f64,

    /// Garage area (sqft).
    #[arg(long, default_value_t = 500.0)]
    pub garage_area: f64,

    /// Original construction year.
    #[arg(long, default_value_t = 2000.0)]
    pub year_built: f64,

    /// Remodel year (same as construction if never remodeled).
    #[arg(long, default_value_t = 2000.0)]
    pub year_remod_add: f64,

    #[arg(long, value_enum, default_value_t = MsZoning::default())]
    pub ms_zoning: MsZoning,

    #[arg(long, value_enum, default_value_t = LotConfig::default())]
    pub lot_config: LotConfig,

    #[arg(long, value_enum, default_value_t = HouseStyle::default())]
    pub house_style: HouseStyle,

    #[command(flatten)]
    pub location: LocationArgs,

    /// Also print the aligned feature row passed to the model.
    #[arg(long)]
    pub show_row: bool,
}

impl PredictArgs {
    pub fn inputs(&self) -> HouseInputs {
        HouseInputs {
            overall_qual: self.overall_qual,
            gr_liv_area: self.gr_liv_area,
            total_bsmt_sf: self.total_bsmt_sf,
            garage_cars: self.garage_cars,
            garage_area: self.garage_area,
            year_built: self.year_built,
            year_remod_add: self.year_remod_add,
            ms_zoning: self.ms_zoning,
            lot_config: self.lot_config,
            house_style: self.house_style,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Input CSV (header row with feature names).
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Where to write predictions. Printed to stdout when omitted.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Training CSV.
    #[arg(long, value_name = "CSV")]
    pub data: PathBuf,

    /// Target column.
    #[arg(long, default_value = "SalePrice")]
    pub target: String,

    /// Output model artifact. Defaults to --model / HPP_MODEL_PATH.
    #[arg(long, value_name = "JSON")]
    pub model_out: Option<PathBuf>,

    /// Output schema artifact. Defaults to --schema / HPP_SCHEMA_PATH.
    #[arg(long, value_name = "JSON")]
    pub schema_out: Option<PathBuf>,

    /// Identifier stored in the model artifact.
    #[arg(long, default_value = "house-price-ols")]
    pub model_id: String,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of houses to generate.
    #[arg(short = 'n', long, default_value_t = 500)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the price noise.
    #[arg(long, default_value_t = 15000.0)]
    pub noise: f64,

    /// Output CSV.
    #[arg(long, value_name = "CSV", default_value = "houses.csv")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_flags_map_to_inputs() {
        let cli = Cli::parse_from([
            "hpp",
            "predict",
            "--overall-qual",
            "8",
            "--ms-zoning",
            "FV",
            "--house-style",
            "2Story",
            "--lat",
            "-33.9",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let inputs = args.inputs();
        assert_eq!(inputs.overall_qual, 8.0);
        assert_eq!(inputs.ms_zoning, MsZoning::Fv);
        assert_eq!(inputs.house_style, HouseStyle::TwoStory);
        assert_eq!(inputs.gr_liv_area, 1500.0);
        let c = args.location.resolve(Coordinate::default());
        assert_eq!(c, Coordinate::new(-33.9, -74.0060));
    }

    #[test]
    fn predict_defaults_match_form_defaults() {
        let cli = Cli::parse_from(["hpp", "predict"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.inputs(), HouseInputs::default());
    }

    #[test]
    fn global_artifact_flags() {
        let cli = Cli::parse_from(["hpp", "batch", "--input", "a.csv", "--model", "m.json"]);
        assert_eq!(cli.model, Some(PathBuf::from("m.json")));
        assert!(cli.schema.is_none());
    }
}
