//! Export batch predictions to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per input row, the price (blank on failure) and what reconciliation changed.

use std::path::Path;

use crate::app::pipeline::BatchPrediction;
use crate::error::AppError;

/// Write per-row predictions to a CSV file.
pub fn write_predictions_csv(path: &Path, predictions: &[BatchPrediction]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["line", "predicted_price", "defaulted", "dropped", "unknown_categories", "error"])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for p in predictions {
        let (price, error) = match &p.price {
            Ok(v) => (format!("{v:.2}"), String::new()),
            Err(e) => (String::new(), e.clone()),
        };
        writer
            .write_record([
                p.line.to_string(),
                price,
                p.report.defaulted.join(";"),
                p.report.dropped.join(";"),
                p.report.unknown_categories.join(";"),
                error,
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
