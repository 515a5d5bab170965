//! Tracing subscriber setup.
//!
//! Command-line subcommands log to stderr. The TUI owns the terminal, so it
//! logs to a file instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(filter: &str, target: LogTarget<'_>) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| AppError::new(2, format!("Invalid HPP_LOG filter `{filter}`: {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
    };

    // Already installed (tests, or a caller that set up its own subscriber).
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_filter() {
        let err = init("info,hpp=loudest", LogTarget::Stderr).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn file_target_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hpp.log");
        init("warn", LogTarget::File(&path)).unwrap();
        assert!(path.exists());
    }
}
