// # Remote Executor Trait
//
// Defines the interface for running privileged shell commands on a host.
//
// ## Implementations
//
// - Process launcher (`ssh`, local `sh`): `nodereap-exec-process` crate
// - Future: native SSH/WinRM clients
//
// ## Usage
//
// ```rust,ignore
// use nodereap_core::{HostConfig, RemoteExecutor};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let executor = /* RemoteExecutor implementation */;
//
//     let host = HostConfig::worker("10.0.0.5");
//     let id = executor.exec_sudo(&host, "cat /etc/machine-id").await?;
//     println!("machine id: {}", id);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::HostConfig;

/// Trait for remote command executors
///
/// An executor owns the transport to a host. It knows nothing about
/// clusters, nodes or reconciliation.
///
/// # Contract
///
/// - Run exactly one command per call, with elevated privilege
/// - Return stdout with surrounding whitespace trimmed
/// - Report a non-successful command as `Err`
/// - Never retry: the caller decides whether a failure is tolerated
/// - Own any timeout; callers do not set one
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run `command` on `host` with elevated privilege
    ///
    /// # Parameters
    ///
    /// - `host`: The target host
    /// - `command`: A POSIX shell command line
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: Trimmed stdout
    /// - `Err(Error)`: If the command could not be run or exited unsuccessfully
    async fn exec_sudo(&self, host: &HostConfig, command: &str) -> Result<String, crate::Error>;

    /// Get the executor name (for logging/debugging)
    fn executor_name(&self) -> &'static str;
}

/// Helper trait for constructing executors from configuration
pub trait RemoteExecutorFactory: Send + Sync {
    /// Create a RemoteExecutor instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Executor configuration
    ///
    /// # Returns
    ///
    /// A boxed RemoteExecutor trait object
    fn create(
        &self,
        config: &crate::config::ExecutorConfig,
    ) -> Result<Box<dyn RemoteExecutor>, crate::Error>;
}

#[async_trait]
impl<T: RemoteExecutor + ?Sized> RemoteExecutor for Box<T> {
    async fn exec_sudo(&self, host: &HostConfig, command: &str) -> Result<String, crate::Error> {
        (**self).exec_sudo(host, command).await
    }

    fn executor_name(&self) -> &'static str {
        (**self).executor_name()
    }
}
