// # Process Remote Executor
//
// This crate provides a process-launcher remote executor for nodereap.
//
// ## Purpose
//
// Runs each command through an external launcher program, by default
// `ssh -o BatchMode=yes`. The launcher owns the transport: keys, known hosts,
// jump hosts and timeouts are configured the way the launcher expects
// (e.g. `~/.ssh/config`), not here.
//
// ## Command Shape
//
// ```text
// <launcher...> [-p <port>] [<user>@]<address> sudo -n sh -c '<command>'
// ```
//
// Hosts addressed as `localhost`/`127.0.0.1`/`::1` skip the launcher and run
// `sh -c` (through `sudo -n` when enabled) on this machine.

use async_trait::async_trait;
use nodereap_core::config::{ExecutorConfig, HostConfig};
use nodereap_core::kubectl::shell_quote;
use nodereap_core::traits::{RemoteExecutor, RemoteExecutorFactory};
use nodereap_core::{Error, ExecutorRegistry, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Executor name used in logs and the registry
pub const EXECUTOR_NAME: &str = "process";

/// Remote executor backed by an external launcher program
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    /// Launcher program followed by its leading arguments
    launcher: Vec<String>,

    /// Wrap commands in `sudo -n` for non-root users
    sudo: bool,
}

impl ProcessExecutor {
    /// Create a new process executor
    ///
    /// # Parameters
    ///
    /// - `launcher`: Program and leading arguments (e.g. `["ssh", "-o", "BatchMode=yes"]`)
    /// - `sudo`: Whether to elevate with `sudo -n` when not logging in as root
    pub fn new(launcher: Vec<String>, sudo: bool) -> Result<Self> {
        if launcher.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(Error::executor(EXECUTOR_NAME, "launcher cannot be empty"));
        }
        Ok(Self { launcher, sudo })
    }

    /// Build the program and arguments that run `command` on `host`
    pub fn command_line(&self, host: &HostConfig, command: &str) -> Vec<String> {
        let remote = self.privileged(host, command);

        if is_local(&host.address) {
            return vec!["sh".to_string(), "-c".to_string(), remote];
        }

        let mut argv = self.launcher.clone();
        if let Some(port) = host.port {
            argv.push("-p".to_string());
            argv.push(port.to_string());
        }
        argv.push(match &host.user {
            Some(user) => format!("{}@{}", user, host.address),
            None => host.address.clone(),
        });
        argv.push(remote);
        argv
    }

    fn privileged(&self, host: &HostConfig, command: &str) -> String {
        let is_root = host.user.as_deref() == Some("root");
        if self.sudo && !is_root {
            format!("sudo -n sh -c {}", shell_quote(command))
        } else {
            command.to_string()
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self {
            launcher: vec!["ssh".to_string(), "-o".to_string(), "BatchMode=yes".to_string()],
            sudo: true,
        }
    }
}

#[async_trait]
impl RemoteExecutor for ProcessExecutor {
    async fn exec_sudo(&self, host: &HostConfig, command: &str) -> Result<String> {
        let argv = self.command_line(host, command);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::executor(EXECUTOR_NAME, "empty command line"))?;

        debug!("Running on {} via {}", host.address, program);

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::remote_exec(&host.address, format!("failed to spawn {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "Command on {} exited with {}: {}",
                host.address, output.status, stderr
            );
            return Err(Error::remote_exec(
                &host.address,
                format!("{}: {}", output.status, stderr),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn executor_name(&self) -> &'static str {
        EXECUTOR_NAME
    }
}

fn is_local(address: &str) -> bool {
    matches!(address, "localhost" | "127.0.0.1" | "::1")
}

/// Factory for creating process executors
pub struct ProcessExecutorFactory;

impl RemoteExecutorFactory for ProcessExecutorFactory {
    fn create(&self, config: &ExecutorConfig) -> Result<Box<dyn RemoteExecutor>> {
        match config {
            ExecutorConfig::Process { launcher, sudo } => {
                Ok(Box::new(ProcessExecutor::new(launcher.clone(), *sudo)?))
            }
            _ => Err(Error::config("Invalid config for process executor")),
        }
    }
}

/// Register the process executor with a registry
pub fn register(registry: &ExecutorRegistry) {
    registry.register_executor(EXECUTOR_NAME, Box::new(ProcessExecutorFactory));
}
