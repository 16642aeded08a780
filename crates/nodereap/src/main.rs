// # nodereap - one-shot node reconciliation
//
// This binary is a THIN integration layer. All reconciliation logic lives in
// nodereap-core; this file only:
// 1. Reads configuration from environment variables and a JSON file
// 2. Initializes tracing and the runtime
// 3. Registers executors
// 4. Runs a single reconciliation pass and reports the outcome
//
// ## Configuration
//
// - `NODEREAP_CONFIG`: Path to the JSON reconcile configuration (required)
// - `NODEREAP_DRY_RUN`: `true` to report orphaned nodes without deleting them
// - `NODEREAP_KUBECTL`: Override the kubectl command prefix
// - `NODEREAP_STRICT`: `true` to exit non-zero when any node failed to reconcile
// - `NODEREAP_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export NODEREAP_CONFIG=/etc/nodereap/cluster.json
// export NODEREAP_DRY_RUN=true
//
// nodereap
// ```

use anyhow::{Context, Result};
use nodereap_core::{ExecutorRegistry, NodeOutcome, NodeReconciler, ReconcileConfig};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Reconciliation completed
/// - 1: Configuration or startup error
/// - 2: Reconciliation aborted
/// - 3: Completed with per-node failures (strict mode only)
#[derive(Debug, Clone, Copy)]
enum NodereapExitCode {
    /// Every live node was processed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Identity collection or leader location failed
    RuntimeError = 2,
    /// Some nodes failed and strict mode is on
    Unclean = 3,
}

impl From<NodereapExitCode> for ExitCode {
    fn from(code: NodereapExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application settings
struct Settings {
    config_path: String,
    dry_run: Option<bool>,
    kubectl: Option<String>,
    strict: bool,
    log_level: String,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            config_path: env::var("NODEREAP_CONFIG").context(
                "NODEREAP_CONFIG is required. \
                Set it via: export NODEREAP_CONFIG=/etc/nodereap/cluster.json",
            )?,
            dry_run: env::var("NODEREAP_DRY_RUN")
                .ok()
                .map(|s| parse_bool("NODEREAP_DRY_RUN", &s))
                .transpose()?,
            kubectl: env::var("NODEREAP_KUBECTL").ok(),
            strict: env::var("NODEREAP_STRICT")
                .ok()
                .map(|s| parse_bool("NODEREAP_STRICT", &s))
                .transpose()?
                .unwrap_or(false),
            log_level: env::var("NODEREAP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Load the reconcile configuration and apply environment overrides
    fn load_config(&self) -> Result<ReconcileConfig> {
        let mut config = ReconcileConfig::from_file(&self.config_path)
            .with_context(|| format!("Failed to load {}", self.config_path))?;

        if let Some(dry_run) = self.dry_run {
            config.reconciler.dry_run = dry_run;
        }
        if let Some(ref kubectl) = self.kubectl {
            config.kubectl.command = kubectl.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "NODEREAP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{} must be true or false. Got: {}", name, other),
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return NodereapExitCode::ConfigError.into();
        }
    };

    let log_level = match settings.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return NodereapExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NodereapExitCode::ConfigError.into();
    }

    let config = match settings.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration validation error: {:#}", e);
            return NodereapExitCode::ConfigError.into();
        }
    };

    info!(
        "Configuration loaded: {} host(s), executor {}",
        config.cluster.hosts.len(),
        config.executor.type_name()
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return NodereapExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config, settings.strict)).into()
}

/// Run a single reconciliation pass
async fn run(config: ReconcileConfig, strict: bool) -> NodereapExitCode {
    let registry = ExecutorRegistry::new();

    #[cfg(feature = "process")]
    {
        info!("Registering process executor");
        nodereap_exec_process::register(&registry);
    }

    let executor = match registry.create_executor(&config.executor) {
        Ok(executor) => executor,
        Err(e) => {
            error!(
                "Failed to create executor (available: {:?}): {}",
                registry.list_executors(),
                e
            );
            return NodereapExitCode::ConfigError;
        }
    };

    // Events are mirrored in the logs; nobody consumes the receiver here
    let (reconciler, _events) = match NodeReconciler::from_config(executor, &config) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to create reconciler: {}", e);
            return NodereapExitCode::ConfigError;
        }
    };

    let report = match reconciler.run(&config.cluster).await {
        Ok(report) => report,
        Err(e) => {
            error!("Reconciliation failed: {}", e);
            return NodereapExitCode::RuntimeError;
        }
    };

    for node in &report.nodes {
        match &node.outcome {
            NodeOutcome::DescribeFailed { error } => {
                warn!("{}: could not read machine id: {}", node.node_name, error)
            }
            NodeOutcome::DeleteFailed { machine_id, error } => {
                warn!("{} ({}): delete failed: {}", node.node_name, machine_id, error)
            }
            _ => {}
        }
    }

    info!(
        "Leader {}: {} kept, {} deleted, {} would delete, {} failed in {}ms",
        report.leader.address,
        report.kept().len(),
        report.deleted().len(),
        report.would_delete().len(),
        report.failures().len(),
        report.duration().num_milliseconds()
    );

    if strict && !report.is_clean() {
        return NodereapExitCode::Unclean;
    }

    NodereapExitCode::Completed
}
