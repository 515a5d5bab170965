//! Fit a linear model on ingested rows.
//!
//! Steps:
//! 1. derive the schema from the data (numeric columns in header order, then
//!    one indicator column per observed category, grouped by field)
//! 2. one-hot encode and reconcile every row against that schema
//! 3. solve OLS with intercept
//! 4. package named coefficients + diagnostics as a `LinearModel`

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

use crate::domain::{ExpectedSchema, FieldValue, indicator_name};
use crate::error::AppError;
use crate::features::one_hot;
use crate::io::ingest::{IngestedData, IngestedRow};
use crate::math::{fit_quality, fit_with_intercept};
use crate::model::{LinearModel, ModelMetrics};
use crate::reconcile::reconcile;

pub const MODEL_VERSION: &str = "1";

/// Output of a training run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub schema: ExpectedSchema,
    pub model: LinearModel,
    pub metrics: ModelMetrics,
}

/// How a CSV column is used.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnKind {
    Numeric,
    Categorical(BTreeSet<String>),
    Empty,
}

/// Derive the expected schema from ingested rows.
pub fn derive_schema(data: &IngestedData) -> Result<ExpectedSchema, AppError> {
    let mut names = Vec::new();
    let mut families = Vec::new();
    let mut categories = BTreeMap::new();

    for column in &data.columns {
        match column_kind(column, &data.rows)? {
            ColumnKind::Numeric => names.push(column.clone()),
            ColumnKind::Categorical(labels) => {
                families.extend(labels.iter().map(|label| indicator_name(column, label)));
                categories.insert(column.clone(), labels.into_iter().collect::<Vec<_>>());
            }
            ColumnKind::Empty => {
                warn!(column = %column, "column has no values; left out of schema");
            }
        }
    }

    names.extend(families);
    Ok(ExpectedSchema::new(names)?.with_categories(&categories)?)
}

fn column_kind(column: &str, rows: &[IngestedRow]) -> Result<ColumnKind, AppError> {
    let mut numeric_line = None;
    let mut category_line = None;
    let mut labels = BTreeSet::new();

    for row in rows {
        match row.record.get(column) {
            Some(FieldValue::Number(_)) => {
                numeric_line.get_or_insert(row.line);
            }
            Some(FieldValue::Category(label)) => {
                category_line.get_or_insert(row.line);
                labels.insert(label.clone());
            }
            None => {}
        }
    }

    match (numeric_line, category_line) {
        (Some(n), Some(c)) => Err(AppError::new(
            2,
            format!("Column `{column}` mixes numbers (line {n}) and text (line {c})."),
        )),
        (Some(_), None) => Ok(ColumnKind::Numeric),
        (None, Some(_)) => Ok(ColumnKind::Categorical(labels)),
        (None, None) => Ok(ColumnKind::Empty),
    }
}

/// Train a model on `data` (rows must carry a target).
pub fn train_model(data: &IngestedData, target: &str, model_id: &str) -> Result<TrainOutput, AppError> {
    if data.rows.is_empty() {
        return Err(AppError::new(3, "No valid rows to train on."));
    }

    let schema = derive_schema(data)?;
    let n = data.rows.len();
    let p = schema.len();
    if n <= p {
        warn!(rows = n, features = p, "fewer rows than features; coefficients are not identified");
    }

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut y = Vec::with_capacity(n);
    for (i, row) in data.rows.iter().enumerate() {
        let target_value = row
            .target
            .ok_or_else(|| AppError::new(3, format!("Row at line {} has no target value.", row.line)))?;
        let aligned = reconcile(&one_hot(&row.record), &schema).row;
        for (j, v) in aligned.values().iter().enumerate() {
            x[(i, j)] = *v;
        }
        y.push(target_value);
    }

    let fit = fit_with_intercept(&x, &DVector::from_vec(y.clone()))
        .ok_or_else(|| AppError::new(4, "Least squares solve failed (design matrix too ill-conditioned)."))?;

    let y_hat: Vec<f64> = (&x * &fit.coefficients).iter().map(|v| v + fit.intercept).collect();
    let (rmse, r2) = fit_quality(&y, &y_hat);
    let metrics = ModelMetrics { n, rmse, r2 };

    let coefficients: BTreeMap<String, f64> = schema
        .iter()
        .zip(fit.coefficients.iter())
        .map(|(name, w)| (name.to_string(), *w))
        .collect();
    debug!(intercept = fit.intercept, "fitted coefficients: {coefficients:?}");

    let model = LinearModel {
        model_id: model_id.to_string(),
        model_version: MODEL_VERSION.to_string(),
        trained_at: Some(Utc::now()),
        target: Some(target.to_string()),
        intercept: fit.intercept,
        coefficients,
        metrics: Some(metrics.clone()),
    };
    model.validate()?;

    info!(rows = n, features = p, rmse, r2, "model trained");

    Ok(TrainOutput { schema, model, metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_records;
    use crate::model::Predictor;

    const CSV: &str = "OverallQual,MSZoning,GrLivArea,Notes,SalePrice\n\
                       5,RL,1000,,60000\n\
                       6,RM,1500,,80000\n\
                       7,RL,2000,,90000\n\
                       8,RM,1200,,97000\n\
                       4,RL,1800,,58000\n\
                       9,RM,2200,,117000\n";

    #[test]
    fn schema_lists_numeric_then_indicators() {
        let data = read_records(CSV.as_bytes(), Some("SalePrice")).unwrap();
        let schema = derive_schema(&data).unwrap();
        assert_eq!(schema.names(), &["OverallQual", "GrLivArea", "MSZoning_RL", "MSZoning_RM"]);
        assert_eq!(schema.categories()["MSZoning"], vec!["RL", "RM"]);
        assert_eq!(schema.indicator_family("GrLivArea"), None);
    }

    #[test]
    fn trained_model_reproduces_linear_data() {
        // SalePrice = 10000 * OverallQual + 10 * GrLivArea + (RM ? 5000 : 0)
        let data = read_records(CSV.as_bytes(), Some("SalePrice")).unwrap();
        let out = train_model(&data, "SalePrice", "test").unwrap();

        assert_eq!(out.metrics.n, 6);
        assert!(out.metrics.rmse < 1e-6, "rmse = {}", out.metrics.rmse);
        assert!((out.model.coefficients["OverallQual"] - 10000.0).abs() < 1e-4);
        assert!((out.model.coefficients["GrLivArea"] - 10.0).abs() < 1e-6);
        let rm_minus_rl = out.model.coefficients["MSZoning_RM"] - out.model.coefficients["MSZoning_RL"];
        assert!((rm_minus_rl - 5000.0).abs() < 1e-4);

        let bound = out.model.bind(&out.schema).unwrap();
        let row = reconcile(&one_hot(&data.rows[0].record), &out.schema).row;
        assert!((bound.predict(&row).unwrap() - 60000.0).abs() < 1e-4);
    }

    #[test]
    fn mixed_column_is_rejected() {
        let csv = "a,SalePrice\n1,10\nx,20\n";
        let data = read_records(csv.as_bytes(), Some("SalePrice")).unwrap();
        let err = derive_schema(&data).unwrap_err();
        assert!(err.message().contains("line 2"));
    }

    #[test]
    fn no_rows_is_data_error() {
        let data = read_records("a,SalePrice\n".as_bytes(), Some("SalePrice")).unwrap();
        assert_eq!(train_model(&data, "SalePrice", "m").unwrap_err().exit_code(), 3);
    }
}
