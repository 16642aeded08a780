//! Test doubles and common utilities for reconciliation contract tests
//!
//! [`FakeCluster`] is an in-memory node registry plus a set of hosts. It
//! records every call so tests can assert what was (and was not) contacted.

#![allow(dead_code)]

use nodereap_core::config::{HostConfig, ReconcilerConfig};
use nodereap_core::error::{Error, Result};
use nodereap_core::traits::ClusterOps;
use nodereap_core::{NodeReconciler, ReconcileEvent};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A call made against the fake cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    MachineId(String),
    ListNodes(String),
    Describe { leader: String, node: String },
    Delete { leader: String, node: String },
}

#[derive(Default)]
struct Inner {
    /// Host address → machine id; absent means the query fails
    host_ids: HashMap<String, String>,
    /// Controllers that answer list-nodes
    healthy_controllers: HashSet<String>,
    /// Live registry: node name → recorded machine id
    nodes: Vec<(String, String)>,
    describe_failures: HashSet<String>,
    delete_failures: HashSet<String>,
    calls: Vec<Call>,
}

/// In-memory cluster shared between a test and the reconciler under test
#[derive(Clone, Default)]
pub struct FakeCluster {
    inner: Arc<Mutex<Inner>>,
    delete_call_count: Arc<AtomicUsize>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `address` a machine id it reports when asked directly
    pub fn with_host_id(self, address: &str, machine_id: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .host_ids
            .insert(address.to_string(), machine_id.to_string());
        self
    }

    /// Make `address` answer the node list query
    pub fn with_healthy_controller(self, address: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .healthy_controllers
            .insert(address.to_string());
        self
    }

    /// Register a live node with the machine id the registry recorded
    pub fn with_node(self, name: &str, machine_id: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .nodes
            .push((name.to_string(), machine_id.to_string()));
        self
    }

    /// Make describing `name` fail
    pub fn failing_describe(self, name: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .describe_failures
            .insert(name.to_string());
        self
    }

    /// Make deleting `name` fail
    pub fn failing_delete(self, name: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .delete_failures
            .insert(name.to_string());
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Names currently in the registry
    pub fn node_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .nodes
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of delete calls issued, successful or not
    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    /// Hosts that received any call
    pub fn contacted_hosts(&self) -> HashSet<String> {
        self.calls()
            .into_iter()
            .map(|call| match call {
                Call::MachineId(h) | Call::ListNodes(h) => h,
                Call::Describe { leader, .. } | Call::Delete { leader, .. } => leader,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

#[async_trait::async_trait]
impl ClusterOps for FakeCluster {
    async fn machine_id(&self, host: &HostConfig) -> Result<String> {
        self.record(Call::MachineId(host.address.clone()));
        self.inner
            .lock()
            .unwrap()
            .host_ids
            .get(&host.address)
            .cloned()
            .ok_or_else(|| Error::remote_exec(&host.address, "connection refused"))
    }

    async fn list_nodes(&self, controller: &HostConfig) -> Result<String> {
        self.record(Call::ListNodes(controller.address.clone()));
        let inner = self.inner.lock().unwrap();
        if !inner.healthy_controllers.contains(&controller.address) {
            return Err(Error::remote_exec(
                &controller.address,
                "The connection to the server was refused",
            ));
        }
        let names: Vec<&str> = inner.nodes.iter().map(|(n, _)| n.as_str()).collect();
        Ok(names.join("\n"))
    }

    async fn describe_node_machine_id(&self, leader: &HostConfig, node_name: &str) -> Result<String> {
        self.record(Call::Describe {
            leader: leader.address.clone(),
            node: node_name.to_string(),
        });
        let inner = self.inner.lock().unwrap();
        if inner.describe_failures.contains(node_name) {
            return Err(Error::remote_exec(
                &leader.address,
                format!("nodes \"{}\" not found", node_name),
            ));
        }
        inner
            .nodes
            .iter()
            .find(|(n, _)| n == node_name)
            .map(|(_, id)| id.clone())
            .ok_or_else(|| {
                Error::remote_exec(&leader.address, format!("nodes \"{}\" not found", node_name))
            })
    }

    async fn delete_node(&self, leader: &HostConfig, node_name: &str) -> Result<String> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Delete {
            leader: leader.address.clone(),
            node: node_name.to_string(),
        });
        let mut inner = self.inner.lock().unwrap();
        if inner.delete_failures.contains(node_name) {
            return Err(Error::remote_exec(&leader.address, "forbidden"));
        }
        inner.nodes.retain(|(n, _)| n != node_name);
        Ok(format!("node \"{}\" deleted", node_name))
    }
}

/// Build a reconciler over a clone of `cluster`
pub fn reconciler_for(
    cluster: &FakeCluster,
    dry_run: bool,
) -> (NodeReconciler, mpsc::Receiver<ReconcileEvent>) {
    let config = ReconcilerConfig {
        dry_run,
        event_channel_capacity: 100,
    };
    NodeReconciler::new(Box::new(cluster.clone()), &config).expect("reconciler construction succeeds")
}

/// Drain every event currently buffered in `rx`
pub fn drain_events(rx: &mut mpsc::Receiver<ReconcileEvent>) -> Vec<ReconcileEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
