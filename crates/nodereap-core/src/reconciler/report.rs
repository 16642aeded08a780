//! Per-run reconciliation results

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::HostConfig;

/// What happened to one live node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NodeOutcome {
    /// Machine id belongs to a configured worker
    Kept {
        /// The recorded machine id
        machine_id: String,
    },
    /// Orphaned node removed from the registry
    Deleted {
        /// The recorded machine id
        machine_id: String,
    },
    /// Orphaned node left in place because the run was a dry run
    WouldDelete {
        /// The recorded machine id
        machine_id: String,
    },
    /// The leader could not report the node's machine id
    DescribeFailed {
        /// Failure description
        error: String,
    },
    /// The node was orphaned but the delete command failed
    DeleteFailed {
        /// The recorded machine id
        machine_id: String,
        /// Failure description
        error: String,
    },
}

impl NodeOutcome {
    /// Whether processing this node hit an error
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            NodeOutcome::DescribeFailed { .. } | NodeOutcome::DeleteFailed { .. }
        )
    }

    /// The machine id recorded for the node, if it was read
    pub fn machine_id(&self) -> Option<&str> {
        match self {
            NodeOutcome::Kept { machine_id }
            | NodeOutcome::Deleted { machine_id }
            | NodeOutcome::WouldDelete { machine_id }
            | NodeOutcome::DeleteFailed { machine_id, .. } => Some(machine_id),
            NodeOutcome::DescribeFailed { .. } => None,
        }
    }
}

/// Outcome for a single live node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    /// Node name as reported by the leader
    pub node_name: String,
    /// What happened to it
    #[serde(flatten)]
    pub outcome: NodeOutcome,
}

/// Result of a completed reconciliation run
///
/// A run that produced a report succeeded as a whole even when some nodes
/// failed; use [`ReconcileReport::is_clean`] to tell the two apart.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Controller that served the run
    pub leader: HostConfig,
    /// Number of distinct expected machine ids
    pub expected_ids: usize,
    /// One entry per live node, in leader order
    pub nodes: Vec<NodeReport>,
    /// Whether deletions were suppressed
    pub dry_run: bool,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the last node was processed
    pub finished_at: DateTime<Utc>,
}

impl ReconcileReport {
    /// Names of nodes removed from the registry
    pub fn deleted(&self) -> Vec<&str> {
        self.names_where(|o| matches!(o, NodeOutcome::Deleted { .. }))
    }

    /// Names of nodes a dry run would have removed
    pub fn would_delete(&self) -> Vec<&str> {
        self.names_where(|o| matches!(o, NodeOutcome::WouldDelete { .. }))
    }

    /// Names of nodes kept in the registry
    pub fn kept(&self) -> Vec<&str> {
        self.names_where(|o| matches!(o, NodeOutcome::Kept { .. }))
    }

    /// Nodes whose processing failed
    pub fn failures(&self) -> Vec<&NodeReport> {
        self.nodes.iter().filter(|n| n.outcome.is_failure()).collect()
    }

    /// True when no node failed
    pub fn is_clean(&self) -> bool {
        self.nodes.iter().all(|n| !n.outcome.is_failure())
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }

    fn names_where(&self, predicate: impl Fn(&NodeOutcome) -> bool) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| predicate(&n.outcome))
            .map(|n| n.node_name.as_str())
            .collect()
    }
}
