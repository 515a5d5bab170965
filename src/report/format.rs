//! Formatting helpers for terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (CLI and TUI show the same strings)

use crate::app::pipeline::{BatchPrediction, PredictionOutcome};
use crate::io::ingest::IngestedData;
use crate::reconcile::{AlignedFeatureRow, ReconcileReport};
use crate::train::TrainOutput;

/// Format a price as dollars with thousands separators and two decimals.
///
/// `254831.7` -> `"$254,831.70"`, `-1200.0` -> `"-$1,200.00"`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// The success line shown after a prediction.
pub fn format_prediction(price: f64) -> String {
    format!("Predicted House Price: {}", format_price(price))
}

/// Reconciliation warnings, one per line (empty string when clean).
pub fn format_warnings(report: &ReconcileReport) -> String {
    let mut out = String::new();
    for w in report.warnings() {
        out.push_str("warning: ");
        out.push_str(&w);
        out.push('\n');
    }
    out
}

/// The aligned model input as a two-column table (schema order).
pub fn format_aligned_row(row: &AlignedFeatureRow) -> String {
    let width = row.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(7).clamp(7, 32);

    let mut out = String::new();
    out.push_str(format!("{:<width$} {:>14}", "feature", "value").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<width$} {:-<14}", "", "").trim_end());
    out.push('\n');
    for (name, value) in row.iter() {
        out.push_str(&format!("{:<width$} {:>14}\n", truncate(name, width), fmt_value(value)));
    }
    out
}

/// Everything `hpp predict` prints.
pub fn format_prediction_summary(outcome: &PredictionOutcome, show_row: bool) -> String {
    let mut out = String::new();
    out.push_str(&format_prediction(outcome.price));
    out.push('\n');
    out.push_str(&format_warnings(&outcome.reconciled.report));
    if show_row {
        out.push('\n');
        out.push_str(&format_aligned_row(&outcome.reconciled.row));
    }
    out
}

/// One line per batch row: `line  price  [warnings]`.
pub fn format_batch(predictions: &[BatchPrediction]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>6} {:>16} {}", "line", "price", "notes").trim_end());
    out.push('\n');
    for p in predictions {
        let price = match &p.price {
            Ok(v) => format_price(*v),
            Err(_) => "-".to_string(),
        };
        let notes = match &p.price {
            Err(e) => e.clone(),
            Ok(_) => p.report.warnings().join("; "),
        };
        out.push_str(format!("{:>6} {:>16} {}", p.line, price, notes).trim_end());
        out.push('\n');
    }
    out.push_str(&format_batch_totals(predictions));
    out
}

/// `n rows | k failed | m with warnings`.
pub fn format_batch_totals(predictions: &[BatchPrediction]) -> String {
    let failed = predictions.iter().filter(|p| p.price.is_err()).count();
    let warned = predictions
        .iter()
        .filter(|p| p.price.is_ok() && !p.report.is_clean())
        .count();
    format!(
        "{} row(s) | {failed} failed | {warned} with warnings\n",
        predictions.len()
    )
}

/// Dataset stats + fit diagnostics for `hpp train`.
pub fn format_training_summary(data: &IngestedData, output: &TrainOutput) -> String {
    let mut out = String::new();

    out.push_str("=== hpp - model training ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        data.rows_read,
        data.rows_used(),
        data.row_errors.len()
    ));
    for e in data.row_errors.iter().take(10) {
        out.push_str(&format!("  line {}: {}\n", e.line, e.message));
    }
    if data.row_errors.len() > 10 {
        out.push_str(&format!("  ... {} more\n", data.row_errors.len() - 10));
    }

    out.push_str(&format!("Features: {}\n", output.schema.len()));
    out.push_str(&format!(
        "Fit: n={} RMSE={} R2={:.4}\n",
        output.metrics.n,
        format_price(output.metrics.rmse),
        output.metrics.r2
    ));

    out.push_str("\nCoefficients:\n");
    out.push_str(&format!("  {:<32} {:>16}\n", "(intercept)", fmt_value(output.model.intercept)));
    for name in output.schema.iter() {
        let w = output.model.coefficients.get(name).copied().unwrap_or(f64::NAN);
        out.push_str(&format!("  {:<32} {:>16}\n", truncate(name, 32), fmt_value(w)));
    }

    out
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e12 {
        format!("{v:.0}")
    } else {
        format!("{v:.4}")
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExpectedSchema;
    use crate::domain::FeatureRecord;
    use crate::reconcile::reconcile;

    #[test]
    fn price_has_thousands_separators() {
        assert_eq!(format_price(254831.7), "$254,831.70");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(999.999), "$1,000.00");
        assert_eq!(format_price(1234567.0), "$1,234,567.00");
        assert_eq!(format_price(-1200.0), "-$1,200.00");
    }

    #[test]
    fn prediction_line() {
        assert_eq!(format_prediction(254831.7), "Predicted House Price: $254,831.70");
    }

    #[test]
    fn aligned_row_table_follows_schema_order() {
        let schema = ExpectedSchema::new(["OverallQual", "GarageCars", "MSZoning_RL"]).unwrap();
        let record: FeatureRecord = [("OverallQual", 7.0), ("MSZoning_RM", 1.0)].into_iter().collect();
        let out = reconcile(&record, &schema);

        let table = format_aligned_row(&out.row);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("OverallQual"));
        assert!(lines[2].ends_with(" 7"));
        assert!(lines[4].starts_with("MSZoning_RL"));

        let warnings = format_warnings(&out.report);
        assert!(warnings.contains("GarageCars"));
        assert!(warnings.contains("MSZoning_RM"));
    }

    #[test]
    fn batch_totals_count_failures() {
        let predictions = vec![
            BatchPrediction {
                line: 2,
                price: Ok(100.0),
                report: ReconcileReport::default(),
            },
            BatchPrediction {
                line: 3,
                price: Err("boom".to_string()),
                report: ReconcileReport::default(),
            },
        ];
        assert_eq!(format_batch_totals(&predictions), "2 row(s) | 1 failed | 0 with warnings\n");
        assert!(format_batch(&predictions).contains("boom"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
