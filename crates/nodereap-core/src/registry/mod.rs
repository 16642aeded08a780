//! Plugin-based executor registry
//!
//! The registry allows remote executors to be registered dynamically at
//! runtime, avoiding hardcoded if-else chains in the binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nodereap_core::registry::ExecutorRegistry;
//! use nodereap_core::config::ExecutorConfig;
//!
//! let registry = ExecutorRegistry::new();
//!
//! // In nodereap-exec-process
//! nodereap_exec_process::register(&registry);
//!
//! let executor = registry.create_executor(&ExecutorConfig::default())?;
//! ```

use crate::config::ExecutorConfig;
use crate::error::{Error, Result};
use crate::traits::{RemoteExecutor, RemoteExecutorFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Executor registry for plugin-based executor creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ExecutorRegistry {
    /// Registered executor factories
    executors: RwLock<HashMap<String, Box<dyn RemoteExecutorFactory>>>,
}

impl ExecutorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor factory
    ///
    /// # Parameters
    ///
    /// - `name`: Executor type name (e.g., "process")
    /// - `factory`: Factory object for creating executor instances
    pub fn register_executor(
        &self,
        name: impl Into<String>,
        factory: Box<dyn RemoteExecutorFactory>,
    ) {
        let name = name.into();
        let mut executors = self
            .executors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        executors.insert(name, factory);
    }

    /// Create an executor from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RemoteExecutor>)`: Created executor instance
    /// - `Err(Error)`: If the executor type is not registered or creation fails
    pub fn create_executor(&self, config: &ExecutorConfig) -> Result<Box<dyn RemoteExecutor>> {
        let executor_type = config.type_name();
        let executors = self
            .executors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = executors
            .get(executor_type)
            .ok_or_else(|| Error::config(format!("Unknown executor type: {}", executor_type)))?;

        factory.create(config)
    }

    /// List all registered executor types
    pub fn list_executors(&self) -> Vec<String> {
        let executors = self
            .executors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        executors.keys().cloned().collect()
    }

    /// Check if an executor type is registered
    pub fn has_executor(&self, name: &str) -> bool {
        let executors = self
            .executors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        executors.contains_key(name)
    }
}
