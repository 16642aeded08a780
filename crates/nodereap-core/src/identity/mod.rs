//! Machine identity collection
//!
//! Builds the set of machine identifiers the live cluster is compared
//! against. Identifiers are read from the configured hosts directly, never
//! from the node registry.

use std::collections::HashSet;

use tracing::{debug, error};

use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::traits::ClusterOps;

/// Machine identifiers of every configured worker
///
/// Built once per run and read-only afterwards. Duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedIdentitySet {
    ids: HashSet<String>,
}

impl ExpectedIdentitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `machine_id` belongs to a configured worker
    pub fn contains(&self, machine_id: &str) -> bool {
        self.ids.contains(machine_id)
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the identifiers in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExpectedIdentitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query every worker for its machine identifier
///
/// Workers are queried one at a time in the given order. The first failure
/// aborts collection: a missing identifier would make a healthy node look
/// orphaned.
///
/// # Parameters
///
/// - `ops`: Cluster operations used to reach the hosts
/// - `workers`: Configured worker hosts (may be empty)
///
/// # Returns
///
/// - `Ok(ExpectedIdentitySet)`: One identifier per worker
/// - `Err(Error::IdentityCollection)`: If any worker failed to answer
pub async fn collect_machine_ids(
    ops: &dyn ClusterOps,
    workers: &[HostConfig],
) -> Result<ExpectedIdentitySet> {
    let mut ids = HashSet::with_capacity(workers.len());

    for host in workers {
        match ops.machine_id(host).await {
            Ok(id) => {
                debug!("Worker {} has machine id {}", host.address, id);
                ids.insert(id);
            }
            Err(e) => {
                error!("Failed to read machine id of {}: {}", host.address, e);
                return Err(Error::identity_collection(&host.address, e));
            }
        }
    }

    Ok(ExpectedIdentitySet { ids })
}
