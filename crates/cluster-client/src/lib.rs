//! Cluster Access
//!
//! Thin access layer over the Kubernetes API for the ConfigMap Manager
//! controller: namespaces, ConfigMaps and Deployments through typed APIs,
//! custom resources through the dynamic API.
//!
//! # Example
//!
//! ```no_run
//! use cluster_client::{ClusterClientTrait, KubeClusterClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Kubeconfig first, in-cluster service account otherwise
//! let client = KubeClusterClient::try_default().await?;
//!
//! let namespaces = client.list_namespaces().await?;
//! let configmap = client.get_configmap("default", "app-config").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeClusterClient;
pub use error::ClusterError;
pub use cluster_trait::ClusterClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockClusterClient;
