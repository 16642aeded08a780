//! Core traits for nodereap
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RemoteExecutor`]: Run a privileged shell command on a host
//! - [`ClusterOps`]: The four cluster queries the reconciler depends on
//! - [`HostInventory`]: Expected hosts and their roles

pub mod remote_exec;
pub mod cluster_ops;
pub mod inventory;

pub use remote_exec::{RemoteExecutor, RemoteExecutorFactory};
pub use cluster_ops::ClusterOps;
pub use inventory::HostInventory;
