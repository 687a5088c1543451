//! ConfigMap Manager Controller
//!
//! Polls `ConfigMapManager` custom resources (`blacksyrius.ci.com/v1`) and
//! applies their key/value updates to ConfigMaps in every namespace
//! annotated `owner: blacksyrius`. Deployments consuming an updated
//! ConfigMap through `envFrom` are restarted by bumping a pod template
//! annotation.

mod config;
mod controller;
mod decoder;
mod error;
mod logging;
mod reconciler;
#[cfg(test)]
mod test_utils;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;
    logging::init(config.log_file.as_deref())?;

    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        warn!("rustls crypto provider was already installed: {:?}", e);
    }

    info!("Starting ConfigMap Manager Controller");
    info!("Configuration:");
    info!("  Reconcile interval: {}s", config.reconcile_interval.as_secs());
    info!(
        "  Log file: {}",
        config
            .log_file
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "stdout".to_string())
    );

    // Initialize and run controller
    let controller = Controller::new(&config).await?;
    controller.run().await?;

    info!("ConfigMap Manager Controller stopped");
    Ok(())
}
