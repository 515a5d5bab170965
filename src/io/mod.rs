//! Input/output helpers.
//!
//! - CSV ingest into feature records (`ingest`)
//! - batch prediction exports (`export`)
//! - model/schema JSON read/write (`artifacts`)

pub mod artifacts;
pub mod export;
pub mod ingest;

pub use artifacts::*;
pub use export::*;
pub use ingest::*;
