// # Host Inventory Trait
//
// Supplies the hosts a reconciliation run compares the live cluster against.
//
// ## Implementations
//
// - `ClusterSpec`: hosts declared in the reconcile configuration
// - Future: inventories backed by an external cluster definition

use crate::config::HostConfig;

/// Source of the expected cluster membership
///
/// Both lists are returned in declaration order. Controller probing and
/// identity collection follow that order.
pub trait HostInventory: Send + Sync {
    /// Hosts able to answer node registry queries
    fn controllers(&self) -> Vec<HostConfig>;

    /// Hosts expected to be registered as cluster nodes
    fn workers(&self) -> Vec<HostConfig>;
}
