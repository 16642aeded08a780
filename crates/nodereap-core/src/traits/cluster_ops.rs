// # Cluster Operations Trait
//
// The narrow capability interface the reconciliation algorithm runs against.
// Everything the reconciler knows about hosts and the node registry goes
// through these four calls.
//
// ## Implementations
//
// - `KubectlClusterOps`: renders kubectl commands onto a `RemoteExecutor`
// - Tests: in-memory fakes under `tests/common`

use async_trait::async_trait;

use crate::config::HostConfig;

/// Cluster queries and mutations used by a reconciliation run
///
/// Every call is a single attempt. Implementations must not retry.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Read the machine identifier of `host`, queried on the host itself
    async fn machine_id(&self, host: &HostConfig) -> Result<String, crate::Error>;

    /// List registered node names through `controller`
    ///
    /// Returns the raw command output: one name per line, no header.
    async fn list_nodes(&self, controller: &HostConfig) -> Result<String, crate::Error>;

    /// Read the machine identifier the registry recorded for `node_name`
    async fn describe_node_machine_id(
        &self,
        leader: &HostConfig,
        node_name: &str,
    ) -> Result<String, crate::Error>;

    /// Remove `node_name` from the node registry
    ///
    /// Irreversible. Returns the command output.
    async fn delete_node(&self, leader: &HostConfig, node_name: &str)
    -> Result<String, crate::Error>;
}
