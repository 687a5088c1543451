//! Logging setup.
//!
//! Installs the process-wide `tracing` subscriber. Filtering follows
//! `RUST_LOG` (default `info`); output goes to stdout or is appended to the
//! configured log file.

use crate::error::ControllerError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Initializes logging. Must be called once, before the controller starts.
pub fn init(log_file: Option<&Path>) -> Result<(), ControllerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    ControllerError::Logging(format!(
                        "failed to open log file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .try_init()
        .map_err(|e| ControllerError::Logging(e.to_string()))
}
