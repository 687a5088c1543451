//! Controller configuration.
//!
//! Read once from environment variables at startup.

use crate::error::ControllerError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default seconds between two reconciliation ticks
pub const DEFAULT_RECONCILE_INTERVAL_SECONDS: u64 = 10;

/// Runtime configuration of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Time between the start of two ticks
    pub reconcile_interval: Duration,
    /// Append logs to this file instead of stdout
    pub log_file: Option<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            reconcile_interval: Duration::from_secs(DEFAULT_RECONCILE_INTERVAL_SECONDS),
            log_file: None,
        }
    }
}

impl ControllerConfig {
    /// Loads configuration from `RECONCILE_INTERVAL_SECONDS` and `LOG_FILE`.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let reconcile_interval = match lookup("RECONCILE_INTERVAL_SECONDS") {
            Some(raw) => {
                let seconds = raw.trim().parse::<u64>().map_err(|_| {
                    ControllerError::InvalidConfig(format!(
                        "RECONCILE_INTERVAL_SECONDS must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if seconds == 0 {
                    return Err(ControllerError::InvalidConfig(
                        "RECONCILE_INTERVAL_SECONDS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(seconds)
            }
            None => Duration::from_secs(DEFAULT_RECONCILE_INTERVAL_SECONDS),
        };

        let log_file = lookup("LOG_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            reconcile_interval,
            log_file,
        })
    }
}
