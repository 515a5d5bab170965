//! Shared prediction pipeline used by the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! collect -> one-hot encode -> reconcile -> predict
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::domain::{ExpectedSchema, FeatureRecord, Field, HouseInputs, SessionState};
use crate::error::AppError;
use crate::features::{LocationFeatureProvider, StaticLocationFeatures, collect, one_hot};
use crate::io::artifacts::{read_model, read_schema};
use crate::io::ingest::IngestedRow;
use crate::model::{ModelError, Predictor};
use crate::reconcile::{ReconcileReport, Reconciled, reconcile};

/// Loaded artifacts: everything needed to answer a prediction request.
///
/// Built once at start-up and shared immutably afterwards.
pub struct Engine {
    schema: ExpectedSchema,
    predictor: Box<dyn Predictor>,
    location: Box<dyn LocationFeatureProvider>,
    model_id: String,
    /// Column the model was trained to predict (stripped from batch input).
    target: Option<String>,
}

/// Everything computed for one interactive request.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    /// Raw collected inputs (categoricals still as labels).
    pub record: FeatureRecord,
    pub reconciled: Reconciled,
    pub price: f64,
}

/// One row of a batch run. A failed row carries its error message instead of a price.
#[derive(Debug, Clone)]
pub struct BatchPrediction {
    pub line: usize,
    pub price: Result<f64, String>,
    pub report: ReconcileReport,
}

impl Engine {
    pub fn new(
        schema: ExpectedSchema,
        predictor: Box<dyn Predictor>,
        location: Box<dyn LocationFeatureProvider>,
        model_id: impl Into<String>,
        target: Option<String>,
    ) -> Self {
        Self {
            schema,
            predictor,
            location,
            model_id: model_id.into(),
            target,
        }
    }

    /// Read and bind the artifacts named by `config`.
    ///
    /// Any problem here is fatal: the form must not accept input without a usable model.
    pub fn load(config: &AppConfig) -> Result<Self, AppError> {
        let schema = read_schema(&config.schema_path)?;
        let model = read_model(&config.model_path)?;
        let bound = model.bind(&schema).map_err(|e| {
            AppError::new(
                2,
                format!(
                    "Model '{}' does not match schema '{}': {e}",
                    config.model_path.display(),
                    config.schema_path.display()
                ),
            )
        })?;

        let location: Box<dyn LocationFeatureProvider> = match &config.location_profile {
            Some(path) => Box::new(StaticLocationFeatures::from_file(path)?),
            None => Box::new(StaticLocationFeatures::default()),
        };

        info!(
            model_id = %model.model_id,
            model_version = %model.model_version,
            features = schema.len(),
            "artifacts loaded"
        );

        Ok(Self::new(schema, Box::new(bound), location, model.model_id, model.target))
    }

    pub fn schema(&self) -> &ExpectedSchema {
        &self.schema
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Run one request: validate, collect, encode, reconcile, predict.
    pub fn predict_once(&self, inputs: &HouseInputs, session: &SessionState) -> Result<PredictionOutcome, AppError> {
        inputs.validate()?;

        let record = collect(inputs, session, self.location.as_ref());
        let (reconciled, price) = self.predict_record(&record);
        for warning in reconciled.report.warnings() {
            warn!("{warning}");
        }
        let price = price?;

        debug!(price, coordinate = ?session.coordinate(), "prediction");
        Ok(PredictionOutcome {
            record,
            reconciled,
            price,
        })
    }

    /// Encode + reconcile + predict an already-collected record.
    ///
    /// The reconciliation result is returned even when inference fails so callers can
    /// still show what the model was given.
    pub fn predict_record(&self, record: &FeatureRecord) -> (Reconciled, Result<f64, ModelError>) {
        let reconciled = reconcile(&one_hot(record), &self.schema);
        let price = self.predictor.predict(&reconciled.row);
        (reconciled, price)
    }

    /// Predict every ingested row. Rows are independent and run in parallel; output
    /// order matches input order.
    pub fn predict_batch(&self, rows: &[IngestedRow]) -> Vec<BatchPrediction> {
        rows.par_iter()
            .map(|row| {
                let (reconciled, price) = self.predict_record(&row.record);
                BatchPrediction {
                    line: row.line,
                    price: price.map_err(|e| e.to_string()),
                    report: reconciled.report,
                }
            })
            .collect()
    }

    /// Predicted price as `field` sweeps its range, other inputs held fixed.
    ///
    /// Returns `(value, price)` pairs; points where inference fails are skipped.
    /// Non-numeric fields produce an empty curve.
    pub fn price_curve(
        &self,
        inputs: &HouseInputs,
        session: &SessionState,
        field: Field,
        points: usize,
    ) -> Vec<(f64, f64)> {
        let Some(spec) = field.numeric_spec() else {
            return Vec::new();
        };
        let points = points.max(2);
        let span = spec.chart_max - spec.min;

        let mut curve = Vec::with_capacity(points);
        let mut probe = inputs.clone();
        for i in 0..points {
            let raw = spec.min + span * i as f64 / (points - 1) as f64;
            let value = if spec.step >= 1.0 { raw.round() } else { raw };
            probe.set_numeric(field, value);
            let record = collect(&probe, session, self.location.as_ref());
            if let (_, Ok(price)) = self.predict_record(&record) {
                curve.push((value, price));
            }
        }
        curve.dedup_by(|a, b| a.0 == b.0);
        curve
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("model_id", &self.model_id)
            .field("features", &self.schema.len())
            .finish()
    }
}
