//! Node reconciler
//!
//! The NodeReconciler is responsible for:
//! - Collecting the machine ids of all configured workers
//! - Locating a leader among the configured controllers
//! - Describing every live node through the leader
//! - Deleting nodes whose machine id no configured worker has
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ HostInventory │──── workers ──────┐
//! └───────────────┘                   │
//!         │                           ▼
//!    controllers             ┌──────────────────┐
//!         │                  │ collect identity │── ExpectedIdentitySet ──┐
//!         ▼                  └──────────────────┘                         │
//! ┌───────────────┐                                                       ▼
//! │ locate leader │──── Leader + live node names ──────────────► ┌──────────────┐
//! └───────────────┘                                               │ per node:    │
//!                                                                 │ describe     │
//!                                                                 │ compare      │
//!                                                                 │ keep/delete  │
//!                                                                 └──────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! 1. Identity collection fails → run aborts, cluster untouched
//! 2. No controller answers → run aborts, no node inspected
//! 3. Describe or delete fails for a node → recorded, next node processed
//!
//! Nothing is retried. Every remote call is awaited before the next one is
//! issued.

pub mod report;

pub use report::{NodeOutcome, NodeReport, ReconcileReport};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{KubectlConfig, ReconcileConfig, ReconcilerConfig};
use crate::error::Result;
use crate::identity::{ExpectedIdentitySet, collect_machine_ids};
use crate::kubectl::KubectlClusterOps;
use crate::leader::{Leader, locate_leader};
use crate::traits::{ClusterOps, HostInventory, RemoteExecutor};

/// Events emitted by the NodeReconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Run started
    Started {
        controllers: usize,
        workers: usize,
        dry_run: bool,
    },

    /// Worker machine ids collected
    IdentitiesCollected { count: usize },

    /// A controller answered the node list query
    LeaderSelected { leader: String, nodes: usize },

    /// Node belongs to a configured worker
    NodeKept { node_name: String, machine_id: String },

    /// Orphaned node deleted
    NodeDeleted { node_name: String, machine_id: String },

    /// Orphaned node left in place (dry run)
    NodeWouldDelete { node_name: String, machine_id: String },

    /// Describing or deleting a node failed
    NodeFailed { node_name: String, error: String },

    /// Every live node was processed
    Finished { deleted: usize, failed: usize },

    /// Run stopped before processing nodes
    Aborted { reason: String },
}

/// Reconciles live cluster nodes against configured workers
///
/// ## Lifecycle
///
/// 1. Create with [`NodeReconciler::new()`]
/// 2. Call [`NodeReconciler::run()`] once per reconciliation pass
/// 3. Drain the event receiver for monitoring, or drop it
///
/// A reconciler holds no state between runs; running it twice against an
/// unchanged cluster deletes nothing the second time.
pub struct NodeReconciler {
    /// Cluster operations backend
    ops: Box<dyn ClusterOps>,

    /// Report orphans instead of deleting them
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl NodeReconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ops`: Cluster operations implementation
    /// - `config`: Reconciler settings
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields reconcile events
    pub fn new(
        ops: Box<dyn ClusterOps>,
        config: &ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            ops,
            dry_run: config.dry_run,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Create a reconciler that drives kubectl through `executor`
    pub fn with_executor<E>(
        executor: E,
        kubectl: KubectlConfig,
        config: &ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)>
    where
        E: RemoteExecutor + 'static,
    {
        Self::new(Box::new(KubectlClusterOps::new(executor, kubectl)), config)
    }

    /// Create a reconciler from a full configuration
    pub fn from_config<E>(
        executor: E,
        config: &ReconcileConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)>
    where
        E: RemoteExecutor + 'static,
    {
        config.validate()?;
        Self::with_executor(executor, config.kubectl.clone(), &config.reconciler)
    }

    /// Whether deletions are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run one reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: Every live node was processed (some may have failed)
    /// - `Err(Error)`: Identity collection failed or no leader was found
    pub async fn run(&self, inventory: &dyn HostInventory) -> Result<ReconcileReport> {
        let started_at = chrono::Utc::now();
        let controllers = inventory.controllers();
        let workers = inventory.workers();

        info!(
            "Starting node reconciliation ({} controller(s), {} worker(s){})",
            controllers.len(),
            workers.len(),
            if self.dry_run { ", dry run" } else { "" }
        );
        self.emit_event(ReconcileEvent::Started {
            controllers: controllers.len(),
            workers: workers.len(),
            dry_run: self.dry_run,
        });

        let expected = match collect_machine_ids(self.ops.as_ref(), &workers).await {
            Ok(expected) => expected,
            Err(e) => return Err(self.abort(e)),
        };
        self.emit_event(ReconcileEvent::IdentitiesCollected {
            count: expected.len(),
        });

        let leader = match locate_leader(self.ops.as_ref(), &controllers).await {
            Ok(leader) => leader,
            Err(e) => return Err(self.abort(e)),
        };
        self.emit_event(ReconcileEvent::LeaderSelected {
            leader: leader.host.address.clone(),
            nodes: leader.nodes.len(),
        });

        let nodes = self.reconcile_nodes(&leader, &expected).await;

        let report = ReconcileReport {
            leader: leader.host,
            expected_ids: expected.len(),
            nodes,
            dry_run: self.dry_run,
            started_at,
            finished_at: chrono::Utc::now(),
        };

        let deleted = report.deleted().len();
        let failed = report.failures().len();
        if failed > 0 {
            warn!(
                "Node reconciliation finished with {} failure(s); {} node(s) deleted",
                failed, deleted
            );
        } else {
            info!("Node reconciliation finished; {} node(s) deleted", deleted);
        }
        self.emit_event(ReconcileEvent::Finished { deleted, failed });

        Ok(report)
    }

    /// Process every live node reported by the leader
    ///
    /// Each node is handled exactly once, in leader order. Failures are
    /// recorded in the returned list and never stop the loop.
    pub async fn reconcile_nodes(
        &self,
        leader: &Leader,
        expected: &ExpectedIdentitySet,
    ) -> Vec<NodeReport> {
        let mut reports = Vec::with_capacity(leader.nodes.len());

        for node_name in &leader.nodes {
            let outcome = self.reconcile_node(leader, node_name, expected).await;
            reports.push(NodeReport {
                node_name: node_name.clone(),
                outcome,
            });
        }

        reports
    }

    async fn reconcile_node(
        &self,
        leader: &Leader,
        node_name: &str,
        expected: &ExpectedIdentitySet,
    ) -> NodeOutcome {
        let machine_id = match self
            .ops
            .describe_node_machine_id(&leader.host, node_name)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to read machine id of node {}: {}", node_name, e);
                self.emit_event(ReconcileEvent::NodeFailed {
                    node_name: node_name.to_string(),
                    error: e.to_string(),
                });
                return NodeOutcome::DescribeFailed {
                    error: e.to_string(),
                };
            }
        };

        if expected.contains(&machine_id) {
            debug!("Node {} ({}) is configured, keeping", node_name, machine_id);
            self.emit_event(ReconcileEvent::NodeKept {
                node_name: node_name.to_string(),
                machine_id: machine_id.clone(),
            });
            return NodeOutcome::Kept { machine_id };
        }

        if self.dry_run {
            info!(
                "Node {} ({}) has no configured host, would delete (dry run)",
                node_name, machine_id
            );
            self.emit_event(ReconcileEvent::NodeWouldDelete {
                node_name: node_name.to_string(),
                machine_id: machine_id.clone(),
            });
            return NodeOutcome::WouldDelete { machine_id };
        }

        info!(
            "Node {} ({}) has no configured host, deleting",
            node_name, machine_id
        );
        match self.ops.delete_node(&leader.host, node_name).await {
            Ok(output) => {
                debug!("Delete output for {}: {}", node_name, output);
                self.emit_event(ReconcileEvent::NodeDeleted {
                    node_name: node_name.to_string(),
                    machine_id: machine_id.clone(),
                });
                NodeOutcome::Deleted { machine_id }
            }
            Err(e) => {
                error!("Failed to delete node {}: {}", node_name, e);
                self.emit_event(ReconcileEvent::NodeFailed {
                    node_name: node_name.to_string(),
                    error: e.to_string(),
                });
                NodeOutcome::DeleteFailed {
                    machine_id,
                    error: e.to_string(),
                }
            }
        }
    }

    fn abort(&self, err: crate::Error) -> crate::Error {
        error!("Node reconciliation aborted: {}", err);
        self.emit_event(ReconcileEvent::Aborted {
            reason: err.to_string(),
        });
        err
    }

    /// Emit a reconcile event
    fn emit_event(&self, event: ReconcileEvent) {
        // A closed receiver means nobody is listening, which is fine
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
