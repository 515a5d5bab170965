//! Application error carried up to `main` and turned into an exit code.
//!
//! Exit codes:
//! - 2: configuration, input or artifact problems
//! - 3: no usable data
//! - 4: runtime failures (terminal, inference, writes)

use crate::domain::{InputError, SchemaError};
use crate::model::ModelError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<InputError> for AppError {
    fn from(value: InputError) -> Self {
        AppError::new(2, format!("Invalid input: {value}"))
    }
}

impl From<SchemaError> for AppError {
    fn from(value: SchemaError) -> Self {
        AppError::new(2, format!("Invalid schema artifact: {value}"))
    }
}

impl From<ModelError> for AppError {
    fn from(value: ModelError) -> Self {
        let code = match value {
            ModelError::NonFinitePrediction(_) | ModelError::SchemaMismatch => 4,
            _ => 2,
        };
        AppError::new(code, format!("Model error: {value}"))
    }
}
