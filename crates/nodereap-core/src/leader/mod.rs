//! Cluster leader location
//!
//! Controllers are probed in configured order with a node list query. The
//! first one that answers becomes the leader for the rest of the run and
//! later controllers are never contacted.

use tracing::{debug, info, warn};

use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::traits::ClusterOps;

/// The controller chosen to serve node registry queries for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    /// The controller that answered
    pub host: HostConfig,
    /// Live node names, in the order the controller reported them
    pub nodes: Vec<String>,
}

/// Find the first controller able to list the cluster nodes
///
/// # Parameters
///
/// - `ops`: Cluster operations used to reach the controllers
/// - `controllers`: Configured controllers in probing order
///
/// # Returns
///
/// - `Ok(Leader)`: The first responsive controller and its node list
/// - `Err(Error::NoControllers)`: If `controllers` is empty
/// - `Err(Error::NoLeader)`: If every controller failed; carries the last error
pub async fn locate_leader(ops: &dyn ClusterOps, controllers: &[HostConfig]) -> Result<Leader> {
    let mut last_error = None;

    for (attempt, controller) in controllers.iter().enumerate() {
        match ops.list_nodes(controller).await {
            Ok(output) => {
                let nodes = parse_node_names(&output);
                info!(
                    "Selected {} as leader ({} live node(s))",
                    controller.address,
                    nodes.len()
                );
                return Ok(Leader {
                    host: controller.clone(),
                    nodes,
                });
            }
            Err(e) => {
                warn!(
                    "Controller {} failed to list nodes (attempt {}/{}): {}",
                    controller.address,
                    attempt + 1,
                    controllers.len(),
                    e
                );
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(Error::no_leader(controllers.len(), e)),
        None => Err(Error::NoControllers),
    }
}

/// Split raw node list output into node names
///
/// Any whitespace separates names. Names are not validated further.
pub fn parse_node_names(output: &str) -> Vec<String> {
    let names: Vec<String> = output.split_whitespace().map(str::to_string).collect();
    debug!("Parsed {} node name(s)", names.len());
    names
}
