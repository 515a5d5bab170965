//! Model training: produce the model and schema artifacts from a CSV.
//!
//! Training and prediction share the same encoder and reconciler, so the
//! schema's indicator columns are spelled exactly as live requests spell them.

pub mod fitter;

pub use fitter::*;
