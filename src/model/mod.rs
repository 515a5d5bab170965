//! Trained model and schema artifacts.
//!
//! - `schema_file`: the ordered feature list (plus the encoding it assumes)
//! - `linear`: the serialized linear regressor and its schema-bound form
//! - `Predictor`: the single inference operation the pipeline depends on

pub mod linear;
pub mod schema_file;

pub use linear::*;
pub use schema_file::*;

use crate::reconcile::AlignedFeatureRow;

/// Anything that turns an aligned feature row into a price.
pub trait Predictor: Send + Sync {
    fn predict(&self, row: &AlignedFeatureRow) -> Result<f64, ModelError>;
}

/// Model artifact / inference failures.
#[derive(Debug)]
pub enum ModelError {
    NonFiniteCoefficient { name: String, value: f64 },
    NonFiniteIntercept(f64),
    MissingCoefficient(String),
    UnknownCoefficient(String),
    SchemaMismatch,
    NonFinitePrediction(f64),
    ParseJson(serde_json::Error),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCoefficient { name, value } => {
                write!(f, "non-finite coefficient for '{name}': {value}")
            }
            Self::NonFiniteIntercept(v) => write!(f, "non-finite intercept: {v}"),
            Self::MissingCoefficient(name) => {
                write!(f, "model has no coefficient for schema column '{name}'")
            }
            Self::UnknownCoefficient(name) => {
                write!(f, "model coefficient '{name}' is not a schema column")
            }
            Self::SchemaMismatch => write!(f, "feature row was aligned to a different schema"),
            Self::NonFinitePrediction(v) => write!(f, "model produced a non-finite prediction: {v}"),
            Self::ParseJson(e) => write!(f, "model JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseJson(e) => Some(e),
            _ => None,
        }
    }
}
