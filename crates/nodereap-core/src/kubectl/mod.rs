//! kubectl-backed cluster operations
//!
//! [`KubectlClusterOps`] implements [`ClusterOps`] by rendering shell
//! commands and handing them to a [`RemoteExecutor`]:
//!
//! | Operation                  | Command                                                              |
//! |----------------------------|----------------------------------------------------------------------|
//! | `machine_id`               | `cat /etc/machine-id`                                                |
//! | `list_nodes`               | `<kubectl> get nodes -o custom-columns=NAME:.metadata.name --no-headers` |
//! | `describe_node_machine_id` | `<kubectl> get node '<name>' -o jsonpath='{.status.nodeInfo.machineID}'` |
//! | `delete_node`              | `<kubectl> delete node '<name>'`                                     |

use async_trait::async_trait;
use tracing::debug;

use crate::config::{HostConfig, KubectlConfig};
use crate::error::{Error, Result};
use crate::traits::{ClusterOps, RemoteExecutor};

/// [`ClusterOps`] over a remote executor and the k0s-bundled kubectl
pub struct KubectlClusterOps<E> {
    executor: E,
    config: KubectlConfig,
}

impl<E: RemoteExecutor> KubectlClusterOps<E> {
    /// Create cluster operations with the given kubectl settings
    pub fn new(executor: E, config: KubectlConfig) -> Self {
        Self { executor, config }
    }

    /// Get the underlying executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn machine_id_command(&self) -> String {
        format!("cat {}", shell_quote(&self.config.machine_id_path))
    }

    fn list_nodes_command(&self) -> String {
        format!(
            "{} get nodes -o custom-columns=NAME:.metadata.name --no-headers",
            self.config.command
        )
    }

    fn describe_command(&self, node_name: &str) -> String {
        format!(
            "{} get node {} -o jsonpath='{{.status.nodeInfo.machineID}}'",
            self.config.command,
            shell_quote(node_name)
        )
    }

    fn delete_command(&self, node_name: &str) -> String {
        format!("{} delete node {}", self.config.command, shell_quote(node_name))
    }

    async fn run(&self, host: &HostConfig, command: &str) -> Result<String> {
        debug!(
            "[{}] {}: {}",
            self.executor.executor_name(),
            host.address,
            command
        );
        self.executor.exec_sudo(host, command).await
    }
}

#[async_trait]
impl<E: RemoteExecutor> ClusterOps for KubectlClusterOps<E> {
    async fn machine_id(&self, host: &HostConfig) -> Result<String> {
        let output = self.run(host, &self.machine_id_command()).await?;
        non_empty(host, output.trim(), "empty machine id")
    }

    async fn list_nodes(&self, controller: &HostConfig) -> Result<String> {
        self.run(controller, &self.list_nodes_command()).await
    }

    async fn describe_node_machine_id(&self, leader: &HostConfig, node_name: &str) -> Result<String> {
        let output = self.run(leader, &self.describe_command(node_name)).await?;
        non_empty(
            leader,
            output.trim(),
            &format!("node {} has no recorded machine id", node_name),
        )
    }

    async fn delete_node(&self, leader: &HostConfig, node_name: &str) -> Result<String> {
        self.run(leader, &self.delete_command(node_name)).await
    }
}

fn non_empty(host: &HostConfig, value: &str, message: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::unexpected_output(&host.address, message));
    }
    Ok(value.to_string())
}

/// Single-quote `value` for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
