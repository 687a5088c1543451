//! Main controller implementation.
//!
//! This module contains the `Controller` struct that drives the reconciler
//! on a fixed interval. There is a single worker: a tick always runs to
//! completion before the next one is scheduled, and a tick that overruns
//! the interval delays the next one instead of overlapping with it.
//! Shutdown is only observed between ticks.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use cluster_client::{ClusterClientTrait, KubeClusterClient};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Main controller for ConfigMapManager resources.
#[derive(Debug)]
pub struct Controller {
    reconciler: Reconciler,
    interval: Duration,
}

impl Controller {
    /// Creates a controller connected to the cluster.
    ///
    /// Fails if no usable kubeconfig or in-cluster configuration exists.
    pub async fn new(config: &ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing ConfigMap Manager Controller");

        let cluster_client = KubeClusterClient::try_default().await?;

        Ok(Self::with_client(cluster_client, config.reconcile_interval))
    }

    /// Creates a controller around an existing cluster client.
    pub fn with_client(
        cluster_client: impl ClusterClientTrait + Send + Sync + 'static,
        interval: Duration,
    ) -> Self {
        Self {
            reconciler: Reconciler::new(cluster_client),
            interval,
        }
    }

    /// Runs the controller until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), ControllerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Runs the controller until `shutdown` completes.
    ///
    /// The first tick fires one interval after start.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<(), ControllerError> {
        info!(
            "ConfigMap Manager Controller running (interval: {}s)",
            self.interval.as_secs()
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping ConfigMap Manager Controller");
                    break;
                }
                _ = ticker.tick() => {}
            }

            // Not raced against shutdown: a started tick always completes
            self.tick().await;
        }

        Ok(())
    }

    async fn tick(&self) {
        info!("Checking ConfigMapManager resources...");
        match self.reconciler.reconcile_tick().await {
            Ok(summary) => info!("Tick complete: {}", summary),
            Err(e) => error!("Failed to process ConfigMapManager resources: {}", e),
        }
    }
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use cluster_client::MockClusterClient;
    use serde_json::json;

    fn cluster_with_one_configmap() -> MockClusterClient {
        let client = MockClusterClient::new();
        client.add_namespace(create_test_namespace("ns-a", Some("blacksyrius")));
        client.add_configmap(create_test_configmap("ns-a", "app-config", &[("LOG_LEVEL", "info")]));
        client.add_custom_resource(create_test_configmap_manager(
            "default",
            "manager",
            json!({ "configMaps": [ { "name": "app-config", "updates": [ { "key": "LOG_LEVEL", "newValue": "debug" } ] } ] }),
        ));
        client
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_fixed_interval() {
        let client = cluster_with_one_configmap();
        let controller = Controller::with_client(client.clone(), Duration::from_secs(10));

        controller
            .run_until(tokio::time::sleep(Duration::from_secs(35)))
            .await
            .unwrap();

        // Ticks at 10s, 20s and 30s; each restart step lists deployments once
        assert_eq!(client.deployment_list_calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_interval() {
        let client = cluster_with_one_configmap();
        let controller = Controller::with_client(client.clone(), Duration::from_secs(10));

        controller
            .run_until(tokio::time::sleep(Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(client.deployment_list_calls().is_empty());
        assert_eq!(
            client.configmap("ns-a", "app-config").unwrap().data.unwrap()["LOG_LEVEL"],
            "info"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_does_not_stop_loop() {
        let client = cluster_with_one_configmap();
        client.fail_list_namespaces(true);
        let controller = Controller::with_client(client.clone(), Duration::from_secs(10));

        controller
            .run_until(tokio::time::sleep(Duration::from_secs(25)))
            .await
            .unwrap();

        assert!(client.deployment_list_calls().is_empty());
    }
}
