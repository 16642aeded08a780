//! Error types for nodereap
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nodereap
#[derive(Error, Debug)]
pub enum Error {
    /// A command run through a remote executor failed
    #[error("Remote command failed on {host}: {message}")]
    RemoteExec {
        /// Address of the host the command ran on
        host: String,
        /// Failure description from the executor
        message: String,
    },

    /// A worker host could not report its machine identifier
    #[error("Machine identity collection failed for {host}: {source}")]
    IdentityCollection {
        /// Address of the worker host
        host: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// No controller hosts are configured
    #[error("No controller hosts configured, cannot locate a cluster leader")]
    NoControllers,

    /// Every configured controller failed to list the cluster nodes
    #[error("No controller answered the node list query ({attempted} tried): {source}")]
    NoLeader {
        /// Number of controllers probed
        attempted: usize,
        /// Error reported by the last controller
        #[source]
        source: Box<Error>,
    },

    /// A remote command produced output that cannot be used
    #[error("Unexpected output from {host}: {message}")]
    UnexpectedOutput {
        /// Address of the host that produced the output
        host: String,
        /// What was wrong with it
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config files, local processes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Executor-specific error
    #[error("Executor error ({executor}): {message}")]
    Executor {
        /// Executor name
        executor: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a remote execution error
    pub fn remote_exec(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteExec {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Wrap a failure to read a worker's machine identifier
    pub fn identity_collection(host: impl Into<String>, source: Error) -> Self {
        Self::IdentityCollection {
            host: host.into(),
            source: Box::new(source),
        }
    }

    /// Wrap the last controller's failure once every controller has been tried
    pub fn no_leader(attempted: usize, source: Error) -> Self {
        Self::NoLeader {
            attempted,
            source: Box::new(source),
        }
    }

    /// Create an unexpected output error
    pub fn unexpected_output(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedOutput {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an executor-specific error
    pub fn executor(executor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Executor {
            executor: executor.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts a reconciliation run
    ///
    /// Per-node describe and delete failures are reported through
    /// [`crate::reconciler::NodeOutcome`] instead and never surface here.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::IdentityCollection { .. } | Error::NoControllers | Error::NoLeader { .. }
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
