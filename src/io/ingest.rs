//! CSV ingest into `FeatureRecord`s.
//!
//! The reader is header-driven: every column becomes a feature. Cells that
//! parse as finite numbers become `Number`, other non-empty cells become
//! `Category`, and empty cells are left out of the record (reconciliation
//! defaults them later).
//!
//! Design goals:
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (records keep file order)
//! - **Separation of concerns**: no encoding or fitting here

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{FeatureRecord, FieldValue};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// One usable row.
#[derive(Debug, Clone)]
pub struct IngestedRow {
    /// 1-based line number in the file (header is line 1).
    pub line: usize,
    pub record: FeatureRecord,
    /// Target value, when a target column was requested.
    pub target: Option<f64>,
}

/// Ingest output: usable rows + header + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    /// Column names in file order (target excluded).
    pub columns: Vec<String>,
    pub rows: Vec<IngestedRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.rows.len()
    }
}

/// How the target column is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetColumn<'a> {
    /// Training: the column must exist and be numeric on every used row.
    Required(&'a str),
    /// Prediction: stripped when present, any cell content accepted.
    Optional(&'a str),
}

impl<'a> TargetColumn<'a> {
    fn name(self) -> &'a str {
        match self {
            Self::Required(name) | Self::Optional(name) => name,
        }
    }
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))
}

/// Load a CSV file. When `target` is given, that column is required, must be
/// numeric on every used row, and is kept out of the feature record.
pub fn load_records(path: &Path, target: Option<&str>) -> Result<IngestedData, AppError> {
    read_records(open(path)?, target)
}

/// Load a CSV file for prediction. A `target` column, if the file has one, is
/// kept out of the feature record; its cells are read when numeric and
/// otherwise ignored.
pub fn load_features(path: &Path, target: Option<&str>) -> Result<IngestedData, AppError> {
    read_features(open(path)?, target)
}

pub fn read_records<R: std::io::Read>(reader: R, target: Option<&str>) -> Result<IngestedData, AppError> {
    read_with(reader, target.map(TargetColumn::Required))
}

pub fn read_features<R: std::io::Read>(reader: R, target: Option<&str>) -> Result<IngestedData, AppError> {
    read_with(reader, target.map(TargetColumn::Optional))
}

fn read_with<R: std::io::Read>(reader: R, target: Option<TargetColumn<'_>>) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let target_idx = match target {
        Some(t) => {
            let idx = names.iter().position(|n| n == t.name());
            if idx.is_none() && matches!(t, TargetColumn::Required(_)) {
                return Err(AppError::new(2, format!("Missing target column: `{}`", t.name())));
            }
            idx
        }
        None => None,
    };
    let target_required = matches!(target, Some(TargetColumn::Required(_)));

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &names, target_idx, target_required) {
            Ok((features, target)) => rows.push(IngestedRow {
                line,
                record: features,
                target,
            }),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let columns = names
        .into_iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != target_idx)
        .map(|(_, n)| n)
        .collect();

    Ok(IngestedData {
        columns,
        rows,
        row_errors,
        rows_read,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Column names are otherwise case-sensitive: they must match
    // the schema exactly.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_row(
    record: &StringRecord,
    names: &[String],
    target_idx: Option<usize>,
    target_required: bool,
) -> Result<(FeatureRecord, Option<f64>), String> {
    if record.len() > names.len() {
        return Err(format!("Row has {} cells but the header has {}.", record.len(), names.len()));
    }

    let mut features = FeatureRecord::new();
    let mut target = None;

    for (i, cell) in record.iter().enumerate() {
        let cell = cell.trim();
        if Some(i) == target_idx {
            target = parse_f64(cell);
            if target.is_none() && target_required {
                return Err(format!("Missing/invalid target value `{}`.", names[i]));
            }
            continue;
        }
        if let Some(value) = parse_cell(cell) {
            features.insert(names[i].as_str(), value);
        }
    }

    if target_required && target.is_none() {
        return Err("Missing target value.".to_string());
    }

    Ok((features, target))
}

fn parse_cell(cell: &str) -> Option<FieldValue> {
    if cell.is_empty() {
        return None;
    }
    Some(match parse_f64(cell) {
        Some(v) => FieldValue::Number(v),
        None => FieldValue::Category(cell.to_string()),
    })
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}OverallQual,MSZoning,GrLivArea,SalePrice\n\
                       7,RL,1500,200000\n\
                       5,RM,,150000\n\
                       6,FV,1200,n/a\n\
                       4,RH,900,90000,extra\n";

    #[test]
    fn splits_numbers_and_categories() {
        let data = read_records(CSV.as_bytes(), Some("SalePrice")).unwrap();
        assert_eq!(data.columns, vec!["OverallQual", "MSZoning", "GrLivArea"]);
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used(), 2);

        let first = &data.rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.target, Some(200000.0));
        assert_eq!(first.record.get("MSZoning"), Some(&FieldValue::Category("RL".into())));
        assert_eq!(first.record.get("OverallQual"), Some(&FieldValue::Number(7.0)));

        // Empty cell is omitted rather than stored.
        assert!(!data.rows[1].record.contains("GrLivArea"));
    }

    #[test]
    fn reports_bad_rows_with_line_numbers() {
        let data = read_records(CSV.as_bytes(), Some("SalePrice")).unwrap();
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 5]);
        assert!(data.row_errors[0].message.contains("SalePrice"));
    }

    #[test]
    fn missing_target_column_is_an_error() {
        let err = read_records("a,b\n1,2\n".as_bytes(), Some("SalePrice")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn prediction_strips_target_without_requiring_it() {
        let data = read_features(CSV.as_bytes(), Some("SalePrice")).unwrap();
        assert_eq!(data.columns, vec!["OverallQual", "MSZoning", "GrLivArea"]);
        // The non-numeric target on line 4 no longer rejects the row.
        assert_eq!(data.rows_used(), 3);
        assert_eq!(data.rows[2].target, None);
        assert!(data.rows.iter().all(|r| !r.record.contains("SalePrice")));

        let absent = read_features("OverallQual\n7\n".as_bytes(), Some("SalePrice")).unwrap();
        assert_eq!(absent.columns, vec!["OverallQual"]);
        assert_eq!(absent.rows_used(), 1);
    }

    #[test]
    fn no_target_keeps_every_column() {
        let data = read_records(CSV.as_bytes(), None).unwrap();
        assert_eq!(data.columns.len(), 4);
        assert_eq!(data.rows[2].record.get("SalePrice"), Some(&FieldValue::Category("n/a".into())));
    }
}
