//! Configuration types for nodereap
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::traits::HostInventory;

/// Main reconciliation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Expected cluster membership
    #[serde(default)]
    pub cluster: ClusterSpec,

    /// How cluster commands are rendered on controller hosts
    #[serde(default)]
    pub kubectl: KubectlConfig,

    /// Remote executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Optional reconciler settings
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl ReconcileConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    ///
    /// The file is parsed but not validated; call [`ReconcileConfig::validate`]
    /// before using it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// An empty host list is valid: an empty cluster has nothing to keep.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.cluster.validate()?;
        self.kubectl.validate()?;
        self.executor.validate()?;
        self.reconciler.validate()?;

        Ok(())
    }
}

/// Role of a configured host
///
/// Follows the k0s cluster model where a controller may also run a kubelet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostRole {
    /// Control plane only
    #[serde(rename = "controller")]
    Controller,
    /// Worker only
    #[serde(rename = "worker")]
    Worker,
    /// Control plane member that also registers as a node
    #[serde(rename = "controller+worker")]
    ControllerWorker,
    /// Single-node cluster
    #[serde(rename = "single")]
    Single,
}

impl HostRole {
    /// Whether hosts with this role can answer node registry queries
    pub fn is_controller(&self) -> bool {
        !matches!(self, HostRole::Worker)
    }

    /// Whether hosts with this role register themselves as cluster nodes
    pub fn is_worker(&self) -> bool {
        !matches!(self, HostRole::Controller)
    }

    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            HostRole::Controller => "controller",
            HostRole::Worker => "worker",
            HostRole::ControllerWorker => "controller+worker",
            HostRole::Single => "single",
        }
    }
}

impl fmt::Display for HostRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured host
///
/// The connection fields are opaque to the reconciliation logic; only
/// executors interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host role
    pub role: HostRole,

    /// Address used to reach the host (hostname or IP)
    pub address: String,

    /// Login user, executor default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Connection port, executor default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl HostConfig {
    /// Create a new host configuration
    pub fn new(role: HostRole, address: impl Into<String>) -> Self {
        Self {
            role,
            address: address.into(),
            user: None,
            port: None,
        }
    }

    /// Shorthand for a controller host
    pub fn controller(address: impl Into<String>) -> Self {
        Self::new(HostRole::Controller, address)
    }

    /// Shorthand for a worker host
    pub fn worker(address: impl Into<String>) -> Self {
        Self::new(HostRole::Worker, address)
    }

    /// Set the login user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the connection port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

impl fmt::Display for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.role)
    }
}

/// Expected cluster membership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Configured hosts, in declaration order
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
}

impl ClusterSpec {
    /// Create a cluster spec from a host list
    pub fn new(hosts: Vec<HostConfig>) -> Self {
        Self { hosts }
    }

    /// Validate the host list
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (index, host) in self.hosts.iter().enumerate() {
            if host.address.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "Host #{} has an empty address",
                    index
                )));
            }
            if host.user.as_ref().is_some_and(|u| u.trim().is_empty()) {
                return Err(crate::Error::config(format!(
                    "Host {} has an empty user",
                    host.address
                )));
            }
        }

        Ok(())
    }
}

impl HostInventory for ClusterSpec {
    fn controllers(&self) -> Vec<HostConfig> {
        self.hosts
            .iter()
            .filter(|h| h.role.is_controller())
            .cloned()
            .collect()
    }

    fn workers(&self) -> Vec<HostConfig> {
        self.hosts
            .iter()
            .filter(|h| h.role.is_worker())
            .cloned()
            .collect()
    }
}

/// Cluster command settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubectlConfig {
    /// Command prefix used to talk to the cluster API on a controller
    #[serde(default = "default_kubectl_command")]
    pub command: String,

    /// File holding the machine identifier on every host
    #[serde(default = "default_machine_id_path")]
    pub machine_id_path: String,
}

impl KubectlConfig {
    /// Validate the kubectl settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.command.trim().is_empty() {
            return Err(crate::Error::config("kubectl command cannot be empty"));
        }
        if !self.machine_id_path.starts_with('/') {
            return Err(crate::Error::config(format!(
                "machine-id path must be absolute, got: {}",
                self.machine_id_path
            )));
        }
        Ok(())
    }
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            command: default_kubectl_command(),
            machine_id_path: default_machine_id_path(),
        }
    }
}

fn default_kubectl_command() -> String {
    "k0s kubectl --data-dir=/var/lib/k0s".to_string()
}

fn default_machine_id_path() -> String {
    "/etc/machine-id".to_string()
}

/// Remote executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutorConfig {
    /// Run commands through an external launcher program (e.g. `ssh`)
    Process {
        /// Launcher program and leading arguments
        #[serde(default = "default_launcher")]
        launcher: Vec<String>,
        /// Wrap commands in `sudo` for non-root users
        #[serde(default = "default_sudo")]
        sudo: bool,
    },

    /// Custom executor
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ExecutorConfig {
    /// Validate the executor configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ExecutorConfig::Process { launcher, .. } => {
                if launcher.first().is_none_or(|p| p.trim().is_empty()) {
                    return Err(crate::Error::config("Process executor launcher cannot be empty"));
                }
                Ok(())
            }
            ExecutorConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom executor factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom executor config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the executor type name
    pub fn type_name(&self) -> &str {
        match self {
            ExecutorConfig::Process { .. } => "process",
            ExecutorConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig::Process {
            launcher: default_launcher(),
            sudo: default_sudo(),
        }
    }
}

fn default_launcher() -> Vec<String> {
    vec!["ssh".to_string(), "-o".to_string(), "BatchMode=yes".to_string()]
}

fn default_sudo() -> bool {
    true
}

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Report orphaned nodes without deleting them
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the reconcile event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ReconcilerConfig {
    /// Validate the reconciler settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    256
}
