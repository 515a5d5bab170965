//! Runtime configuration from `.env` / environment variables.
//!
//! Precedence: CLI flag > environment variable > built-in default.
//!
//! | Variable               | Meaning                                   | Default                     |
//! |------------------------|-------------------------------------------|-----------------------------|
//! | `HPP_MODEL_PATH`       | model artifact (JSON)                     | `house_price_model.json`    |
//! | `HPP_SCHEMA_PATH`      | schema artifact (JSON)                    | `house_price_schema.json`   |
//! | `HPP_LOCATION_PROFILE` | location profile (JSON), optional         | built-in "Downtown" profile |
//! | `HPP_DEFAULT_LAT`      | initial map latitude                      | 40.7128                     |
//! | `HPP_DEFAULT_LNG`      | initial map longitude                     | -74.0060                    |
//! | `HPP_LOG`              | tracing filter                            | `info`                      |
//! | `HPP_LOG_FILE`         | log file used by the TUI                  | `hpp.log`                   |

use std::path::PathBuf;

use crate::domain::{Coordinate, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use crate::error::AppError;

pub const DEFAULT_MODEL_PATH: &str = "house_price_model.json";
pub const DEFAULT_SCHEMA_PATH: &str = "house_price_schema.json";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "hpp.log";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub schema_path: PathBuf,
    pub location_profile: Option<PathBuf>,
    pub start_coordinate: Coordinate,
    pub log_filter: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            location_profile: None,
            start_coordinate: Coordinate::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and read the `HPP_*` variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));
        let mut config = Self::default();

        if let Some(v) = get("HPP_MODEL_PATH") {
            config.model_path = PathBuf::from(v);
        }
        if let Some(v) = get("HPP_SCHEMA_PATH") {
            config.schema_path = PathBuf::from(v);
        }
        config.location_profile = get("HPP_LOCATION_PROFILE").map(PathBuf::from);
        if let Some(v) = get("HPP_LOG") {
            config.log_filter = v;
        }
        if let Some(v) = get("HPP_LOG_FILE") {
            config.log_file = PathBuf::from(v);
        }

        let latitude = parse_f64("HPP_DEFAULT_LAT", get("HPP_DEFAULT_LAT"))?.unwrap_or(DEFAULT_LATITUDE);
        let longitude = parse_f64("HPP_DEFAULT_LNG", get("HPP_DEFAULT_LNG"))?.unwrap_or(DEFAULT_LONGITUDE);
        let start = Coordinate::new(latitude, longitude);
        if !start.is_valid() {
            return Err(AppError::new(
                2,
                format!("HPP_DEFAULT_LAT/HPP_DEFAULT_LNG out of range: ({latitude}, {longitude})."),
            ));
        }
        config.start_coordinate = start;

        Ok(config)
    }

    /// Apply the global `--model` / `--schema` flags.
    pub fn with_overrides(mut self, model: Option<PathBuf>, schema: Option<PathBuf>) -> Self {
        if let Some(path) = model {
            self.model_path = path;
        }
        if let Some(path) = schema {
            self.schema_path = path;
        }
        self
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_f64(name: &str, raw: Option<String>) -> Result<Option<f64>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| AppError::new(2, format!("{name} is not a number: `{raw}`.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.start_coordinate, Coordinate::new(40.7128, -74.0060));
    }

    #[test]
    fn reads_paths_and_coordinate() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HPP_MODEL_PATH", "m.json"),
            ("HPP_SCHEMA_PATH", " s.json "),
            ("HPP_LOCATION_PROFILE", "loc.json"),
            ("HPP_DEFAULT_LAT", "51.5"),
            ("HPP_DEFAULT_LNG", "-0.12"),
            ("HPP_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.model_path, PathBuf::from("m.json"));
        assert_eq!(config.schema_path, PathBuf::from("s.json"));
        assert_eq!(config.location_profile, Some(PathBuf::from("loc.json")));
        assert_eq!(config.start_coordinate, Coordinate::new(51.5, -0.12));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = AppConfig::from_lookup(lookup(&[("HPP_MODEL_PATH", "  ")])).unwrap();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn bad_coordinate_is_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("HPP_DEFAULT_LAT", "north")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = AppConfig::from_lookup(lookup(&[("HPP_DEFAULT_LAT", "95")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn cli_overrides_win() {
        let config = AppConfig::default().with_overrides(Some(PathBuf::from("x.json")), None);
        assert_eq!(config.model_path, PathBuf::from("x.json"));
        assert_eq!(config.schema_path, PathBuf::from(DEFAULT_SCHEMA_PATH));
    }
}
