//! Formatted terminal output: prices, reconciliation warnings, aligned rows and
//! training summaries.

pub mod format;

pub use format::*;
