// # nodereap-core
//
// Core library for reconciling a live cluster's node registry against the
// hosts it is configured to have.
//
// ## Architecture Overview
//
// - **RemoteExecutor**: Trait for running privileged commands on a host
// - **ClusterOps**: The four cluster calls the reconciler depends on
// - **KubectlClusterOps**: ClusterOps rendered as kubectl commands over a RemoteExecutor
// - **NodeReconciler**: Collect identities → locate leader → keep or delete each node
// - **ExecutorRegistry**: Plugin-based registry for remote executors
//
// ## Design Principles
//
// 1. **Narrow Seams**: The algorithm only sees `ClusterOps`, never a transport
// 2. **Fail Fast Before Mutating**: Missing identities or leader abort the run
// 3. **Tolerant Per Node**: One node's failure never stops the others
// 4. **No Hidden Retries**: Every remote call is a single attempt
// 5. **Library-First**: The binary is a thin wrapper

pub mod traits;
pub mod config;
pub mod error;
pub mod identity;
pub mod kubectl;
pub mod leader;
pub mod reconciler;
pub mod registry;

// Re-export core types for convenience
pub use traits::{ClusterOps, HostInventory, RemoteExecutor, RemoteExecutorFactory};
pub use config::{
    ClusterSpec, ExecutorConfig, HostConfig, HostRole, KubectlConfig, ReconcileConfig,
    ReconcilerConfig,
};
pub use error::{Error, Result};
pub use identity::{ExpectedIdentitySet, collect_machine_ids};
pub use kubectl::KubectlClusterOps;
pub use leader::{Leader, locate_leader};
pub use reconciler::{NodeOutcome, NodeReconciler, NodeReport, ReconcileEvent, ReconcileReport};
pub use registry::ExecutorRegistry;
