//! Debug snapshot writer for inspecting one prediction request.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::PredictionOutcome;
use crate::domain::{Field, HouseInputs, SessionState};
use crate::error::AppError;
use crate::report::format_price;

/// What the form looked like when the snapshot was taken.
#[derive(Debug, Clone, Copy)]
pub struct DebugContext<'a> {
    pub model_id: &'a str,
    pub inputs: &'a HouseInputs,
    pub session: &'a SessionState,
    pub outcome: Option<&'a PredictionOutcome>,
    pub error: Option<&'a str>,
}

/// Write a timestamped markdown snapshot under `dir` and return its path.
pub fn write_debug_snapshot(dir: &Path, ctx: &DebugContext<'_>) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S%.3f");
    let path = dir.join(format!("hpp_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(render_debug_snapshot(ctx).as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

/// Markdown body of a snapshot.
pub fn render_debug_snapshot(ctx: &DebugContext<'_>) -> String {
    let mut out = String::new();
    let coordinate = ctx.session.coordinate();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# hpp debug snapshot");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(out, "- model_id: {}", ctx.model_id);
    let _ = writeln!(out, "- coordinate: {:.6}, {:.6}", coordinate.latitude, coordinate.longitude);

    let _ = writeln!(out, "\n## Inputs");
    let _ = writeln!(out, "| field | value |");
    let _ = writeln!(out, "| - | - |");
    for field in Field::FORM {
        let _ = writeln!(out, "| {} | {} |", field.as_str(), ctx.inputs.display_value(field));
    }

    let Some(outcome) = ctx.outcome else {
        let _ = writeln!(out, "\n## Prediction");
        let _ = writeln!(out, "{}", ctx.error.unwrap_or("not run yet"));
        return out;
    };

    let _ = writeln!(out, "\n## Feature record");
    let _ = writeln!(out, "| name | value |");
    let _ = writeln!(out, "| - | - |");
    for (name, value) in outcome.record.iter() {
        let _ = writeln!(out, "| {name} | {value} |");
    }

    let _ = writeln!(out, "\n## Aligned row");
    let _ = writeln!(out, "| # | feature | value |");
    let _ = writeln!(out, "| - | - | - |");
    for (i, (name, value)) in outcome.reconciled.row.iter().enumerate() {
        let _ = writeln!(out, "| {i} | {name} | {value} |");
    }

    let report = &outcome.reconciled.report;
    let _ = writeln!(out, "\n## Reconciliation");
    let _ = writeln!(out, "- defaulted: {}", list(&report.defaulted));
    let _ = writeln!(out, "- inactive_indicators: {}", list(&report.inactive_indicators));
    let _ = writeln!(out, "- dropped: {}", list(&report.dropped));
    let _ = writeln!(out, "- unknown_categories: {}", list(&report.unknown_categories));
    let _ = writeln!(out, "- unencoded: {}", list(&report.unencoded));

    let _ = writeln!(out, "\n## Prediction");
    let _ = writeln!(out, "{}", format_price(outcome.price));
    out
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::engine;

    #[test]
    fn snapshot_lists_every_stage() {
        let engine = engine();
        let inputs = HouseInputs::default();
        let session = SessionState::default();
        let outcome = engine.predict_once(&inputs, &session).unwrap();
        let ctx = DebugContext {
            model_id: engine.model_id(),
            inputs: &inputs,
            session: &session,
            outcome: Some(&outcome),
            error: None,
        };

        let body = render_debug_snapshot(&ctx);
        assert!(body.contains("| OverallQual | 5 |"));
        assert!(body.contains("| 2 | MSZoning_RL | 1 |"));
        assert!(body.contains("- dropped: "));
        assert!(body.contains("$275,000.00"));

        let dir = tempfile::tempdir().unwrap();
        let path = write_debug_snapshot(dir.path(), &ctx).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().starts_with("# hpp debug snapshot"));
    }

    #[test]
    fn snapshot_without_prediction_shows_error() {
        let inputs = HouseInputs::default();
        let session = SessionState::default();
        let ctx = DebugContext {
            model_id: "m",
            inputs: &inputs,
            session: &session,
            outcome: None,
            error: Some("Invalid input: boom"),
        };
        assert!(render_debug_snapshot(&ctx).ends_with("Invalid input: boom\n"));
    }
}
