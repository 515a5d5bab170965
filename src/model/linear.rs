//! Linear regression model artifact.
//!
//! Weights are stored by feature name rather than position so an artifact can
//! be checked against the schema it is paired with. `bind` resolves the names
//! to positions once; `BoundModel::predict` is then a single dot product.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::ExpectedSchema;
use crate::model::{ModelError, Predictor};
use crate::reconcile::AlignedFeatureRow;

/// Training diagnostics stored alongside the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub n: usize,
    pub rmse: f64,
    pub r2: f64,
}

/// Serializable linear model: `price = intercept + Σ coefficients[name] * x[name]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub model_id: String,
    pub model_version: String,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    /// Name of the target column the model was fit on.
    #[serde(default)]
    pub target: Option<String>,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    pub metrics: Option<ModelMetrics>,
}

impl LinearModel {
    /// Check that all parameters are finite.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.intercept.is_finite() {
            return Err(ModelError::NonFiniteIntercept(self.intercept));
        }
        for (name, &w) in &self.coefficients {
            if !w.is_finite() {
                return Err(ModelError::NonFiniteCoefficient {
                    name: name.clone(),
                    value: w,
                });
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json).map_err(ModelError::ParseJson)?;
        model.validate()?;
        Ok(model)
    }

    /// Resolve named coefficients against `schema`.
    ///
    /// Every schema column needs a coefficient and every coefficient must name a
    /// schema column; anything else means the two artifacts were not produced
    /// together.
    pub fn bind(&self, schema: &ExpectedSchema) -> Result<BoundModel, ModelError> {
        self.validate()?;

        if let Some(unknown) = self.coefficients.keys().find(|name| !schema.contains(name)) {
            return Err(ModelError::UnknownCoefficient(unknown.clone()));
        }

        let mut weights = Vec::with_capacity(schema.len());
        for name in schema.iter() {
            let w = self
                .coefficients
                .get(name)
                .copied()
                .ok_or_else(|| ModelError::MissingCoefficient(name.to_string()))?;
            weights.push(w);
        }

        Ok(BoundModel {
            schema: schema.clone(),
            intercept: self.intercept,
            weights: DVector::from_vec(weights),
        })
    }
}

/// A model whose weights are positioned to match one schema.
#[derive(Debug, Clone)]
pub struct BoundModel {
    schema: ExpectedSchema,
    intercept: f64,
    weights: DVector<f64>,
}

impl Predictor for BoundModel {
    fn predict(&self, row: &AlignedFeatureRow) -> Result<f64, ModelError> {
        if row.schema() != &self.schema {
            return Err(ModelError::SchemaMismatch);
        }
        let x = DVector::from_column_slice(row.values());
        let y = self.intercept + self.weights.dot(&x);
        if !y.is_finite() {
            return Err(ModelError::NonFinitePrediction(y));
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureRecord;
    use crate::reconcile::reconcile;

    fn model(coefs: &[(&str, f64)]) -> LinearModel {
        LinearModel {
            model_id: "test".to_string(),
            model_version: "1".to_string(),
            trained_at: None,
            target: None,
            intercept: 1000.0,
            coefficients: coefs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            metrics: None,
        }
    }

    #[test]
    fn predicts_dot_product_in_schema_order() {
        let schema = ExpectedSchema::new(["GrLivArea", "OverallQual"]).unwrap();
        let bound = model(&[("OverallQual", 10_000.0), ("GrLivArea", 100.0)])
            .bind(&schema)
            .unwrap();

        let record: FeatureRecord = [("OverallQual", 7.0), ("GrLivArea", 1500.0)].into_iter().collect();
        let row = reconcile(&record, &schema).row;
        let y = bound.predict(&row).unwrap();
        assert!((y - (1000.0 + 70_000.0 + 150_000.0)).abs() < 1e-9);
    }

    #[test]
    fn bind_rejects_missing_and_unknown() {
        let schema = ExpectedSchema::new(["a", "b"]).unwrap();
        assert!(matches!(
            model(&[("a", 1.0)]).bind(&schema),
            Err(ModelError::MissingCoefficient(name)) if name == "b"
        ));
        assert!(matches!(
            model(&[("a", 1.0), ("b", 1.0), ("c", 1.0)]).bind(&schema),
            Err(ModelError::UnknownCoefficient(name)) if name == "c"
        ));
    }

    #[test]
    fn predict_rejects_foreign_schema() {
        let schema = ExpectedSchema::new(["a"]).unwrap();
        let other = ExpectedSchema::new(["b"]).unwrap();
        let bound = model(&[("a", 1.0)]).bind(&schema).unwrap();
        let row = reconcile(&FeatureRecord::new(), &other).row;
        assert!(matches!(bound.predict(&row), Err(ModelError::SchemaMismatch)));
    }

    #[test]
    fn json_rejects_non_finite_weights() {
        let err = LinearModel::from_json(
            r#"{"model_id":"m","model_version":"1","intercept":1e999,"coefficients":{}}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn json_round_trip() {
        let m = model(&[("a", 2.5)]);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(LinearModel::from_json(&json).unwrap(), m);
    }
}
