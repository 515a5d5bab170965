//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the typed form state (`HouseInputs`) and its field catalogue (`Field`)
//! - categorical choices (`MsZoning`, `LotConfig`, `HouseStyle`)
//! - per-request feature records (`FeatureRecord`, `FieldValue`)
//! - the training-time column list (`ExpectedSchema`)
//! - session state carried between renders (`SessionState`)

pub mod fields;
pub mod schema;
pub mod types;

pub use fields::*;
pub use schema::*;
pub use types::*;
