//! ConfigMap Manager CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the ConfigMap Manager controller.

pub mod configmap_manager;

pub use configmap_manager::*;
