//! Read/write model and schema artifacts.
//!
//! Both are JSON. They are loaded once at start-up; any failure here is fatal
//! and reported with exit code 2 before the form accepts input.

use std::fs::File;
use std::path::Path;

use crate::domain::ExpectedSchema;
use crate::error::AppError;
use crate::model::{LinearModel, SchemaFile};

/// Read and validate a schema artifact.
pub fn read_schema(path: &Path) -> Result<ExpectedSchema, AppError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open schema artifact '{}': {e}", path.display())))?;
    let file = SchemaFile::from_json(&json)
        .map_err(|e| AppError::new(2, format!("Invalid schema JSON '{}': {e}", path.display())))?;
    Ok(file.to_schema()?)
}

/// Write a schema artifact (object form, with encoding metadata).
pub fn write_schema(path: &Path, schema: &ExpectedSchema) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create schema artifact '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &SchemaFile::from_schema(schema))
        .map_err(|e| AppError::new(4, format!("Failed to write schema JSON: {e}")))?;
    Ok(())
}

/// Read and validate a model artifact.
pub fn read_model(path: &Path) -> Result<LinearModel, AppError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model artifact '{}': {e}", path.display())))?;
    Ok(LinearModel::from_json(&json)?)
}

/// Write a model artifact.
pub fn write_model(path: &Path, model: &LinearModel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model artifact '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::new(4, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn artifacts_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.json");
        let model_path = dir.path().join("model.json");

        let schema = ExpectedSchema::new(["OverallQual", "MSZoning_RL"]).unwrap();
        write_schema(&schema_path, &schema).unwrap();
        assert_eq!(read_schema(&schema_path).unwrap(), schema);

        let model = LinearModel {
            model_id: "m".to_string(),
            model_version: "1".to_string(),
            trained_at: None,
            target: Some("SalePrice".to_string()),
            intercept: 10.0,
            coefficients: BTreeMap::from([("OverallQual".to_string(), 1.0), ("MSZoning_RL".to_string(), 2.0)]),
            metrics: None,
        };
        write_model(&model_path, &model).unwrap();
        let back = read_model(&model_path).unwrap();
        assert_eq!(back, model);
        assert!(back.bind(&schema).is_ok());
    }

    #[test]
    fn missing_artifacts_are_fatal_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_model(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = read_schema(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_schema_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_schema(&path).unwrap_err();
        assert!(err.message().contains("Invalid schema JSON"));
    }
}
