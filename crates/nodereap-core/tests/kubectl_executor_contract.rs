//! Contract Test: Reconciliation Over a Remote Executor
//!
//! Drives the full reconciler through `KubectlClusterOps` with an executor
//! that emulates the k0s-bundled kubectl on each host.
//!
//! Constraints verified:
//! - Machine ids are read on the hosts themselves
//! - List, describe and delete are issued on the leader only
//! - Node names reach the shell quoted

use async_trait::async_trait;
use nodereap_core::{
    ClusterSpec, Error, HostConfig, NodeReconciler, ReconcileConfig, RemoteExecutor, Result,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const KUBECTL: &str = "k0s kubectl --data-dir=/var/lib/k0s";

/// Emulates `cat /etc/machine-id` on every host and kubectl on controllers
#[derive(Clone, Default)]
struct EmulatedHosts {
    machine_ids: HashMap<String, String>,
    controllers: Vec<String>,
    registry: Arc<Mutex<Vec<(String, String)>>>,
    log: Arc<Mutex<Vec<(String, String)>>>,
}

impl EmulatedHosts {
    fn log(&self) -> Vec<(String, String)> {
        self.log.lock().unwrap().clone()
    }

    fn registry_names(&self) -> Vec<String> {
        self.registry
            .lock()
            .unwrap()
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteExecutor for EmulatedHosts {
    async fn exec_sudo(&self, host: &HostConfig, command: &str) -> Result<String> {
        self.log
            .lock()
            .unwrap()
            .push((host.address.clone(), command.to_string()));

        if command == "cat '/etc/machine-id'" {
            return self
                .machine_ids
                .get(&host.address)
                .map(|id| format!("{}\n", id))
                .ok_or_else(|| Error::remote_exec(&host.address, "No such file or directory"));
        }

        if !self.controllers.contains(&host.address) {
            return Err(Error::remote_exec(&host.address, "k0s: command not found"));
        }

        let mut registry = self.registry.lock().unwrap();
        let kubectl_args = command
            .strip_prefix(KUBECTL)
            .ok_or_else(|| Error::remote_exec(&host.address, "unexpected command"))?
            .trim();

        if kubectl_args == "get nodes -o custom-columns=NAME:.metadata.name --no-headers" {
            let names: Vec<&str> = registry.iter().map(|(n, _)| n.as_str()).collect();
            return Ok(format!("{}\n", names.join("\n")));
        }

        if let Some(rest) = kubectl_args.strip_prefix("get node '") {
            let name = rest.split('\'').next().unwrap_or_default();
            return registry
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, id)| id.clone())
                .ok_or_else(|| Error::remote_exec(&host.address, "NotFound"));
        }

        if let Some(rest) = kubectl_args.strip_prefix("delete node '") {
            let name = rest.trim_end_matches('\'').to_string();
            registry.retain(|(n, _)| *n != name);
            return Ok(format!("node \"{}\" deleted", name));
        }

        Err(Error::remote_exec(&host.address, "unknown kubectl invocation"))
    }

    fn executor_name(&self) -> &'static str {
        "emulated"
    }
}

fn hosts() -> EmulatedHosts {
    EmulatedHosts {
        machine_ids: HashMap::from([
            ("10.0.0.1".to_string(), "aaaa".to_string()),
            ("10.0.0.11".to_string(), "1111".to_string()),
        ]),
        controllers: vec!["10.0.0.1".to_string()],
        registry: Arc::new(Mutex::new(vec![
            ("worker-1".to_string(), "1111".to_string()),
            ("worker-2".to_string(), "2222".to_string()),
        ])),
        log: Arc::new(Mutex::new(Vec::new())),
    }
}

fn config(dry_run: bool) -> ReconcileConfig {
    let mut config = ReconcileConfig::new();
    config.cluster = ClusterSpec::new(vec![
        HostConfig::controller("10.0.0.1"),
        HostConfig::worker("10.0.0.11"),
    ]);
    config.reconciler.dry_run = dry_run;
    config
}

#[tokio::test]
async fn deletes_removed_worker_through_kubectl() {
    let executor = hosts();
    let config = config(false);
    let (reconciler, _events) =
        NodeReconciler::from_config(executor.clone(), &config).expect("valid config");

    let report = reconciler.run(&config.cluster).await.unwrap();

    assert_eq!(report.kept(), vec!["worker-1"]);
    assert_eq!(report.deleted(), vec!["worker-2"]);
    assert_eq!(executor.registry_names(), vec!["worker-1"]);

    let log = executor.log();
    assert_eq!(log[0], ("10.0.0.11".to_string(), "cat '/etc/machine-id'".to_string()));
    assert!(log[1..].iter().all(|(host, _)| host == "10.0.0.1"));
    assert_eq!(
        log.last().unwrap().1,
        format!("{} delete node 'worker-2'", KUBECTL)
    );
}

#[tokio::test]
async fn dry_run_issues_no_delete_command() {
    let executor = hosts();
    let config = config(true);
    let (reconciler, _events) =
        NodeReconciler::from_config(executor.clone(), &config).expect("valid config");

    let report = reconciler.run(&config.cluster).await.unwrap();

    assert_eq!(report.would_delete(), vec!["worker-2"]);
    assert_eq!(executor.registry_names(), vec!["worker-1", "worker-2"]);
    assert!(executor.log().iter().all(|(_, cmd)| !cmd.contains("delete")));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut config = config(false);
    config.kubectl.command = String::new();

    assert!(NodeReconciler::from_config(hosts(), &config).is_err());
}
