//! `house-price` library crate.
//!
//! The binary (`hpp`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the form, the CLI and the training tool share one pipeline
//!
//! Request flow: `features::collect` -> `features::one_hot` ->
//! `reconcile::reconcile` -> `model::Predictor::predict`.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod math;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod train;
pub mod tui;
