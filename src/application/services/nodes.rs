//! Node service

use std::sync::Arc;

use tracing::debug;

use crate::application::ApplicationResult;
use crate::domain::{select, NamePattern};
use crate::infrastructure::JenkinsApi;

/// One row of the node listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub name: String,
    /// Assigned labels without the node's own name
    pub labels: Vec<String>,
    pub executors: u32,
    pub offline: bool,
}

/// Service for inspecting nodes.
pub struct NodeService {
    api: Arc<dyn JenkinsApi>,
}

impl NodeService {
    /// Create a new node service.
    pub fn new(api: Arc<dyn JenkinsApi>) -> Self {
        Self { api }
    }

    /// Matching nodes with their details, in listing order.
    ///
    /// Nodes that disappear between listing and lookup are left out.
    pub fn list(&self, pattern: &NamePattern) -> ApplicationResult<Vec<NodeRow>> {
        let nodes = select(self.api.get_nodes()?, pattern);
        let mut rows = Vec::with_capacity(nodes.len());
        for node in nodes {
            if !self.api.node_exists(&node.name)? {
                debug!("list: node {} vanished", node.name);
                continue;
            }
            let info = self.api.get_node_info(&node.name)?;
            rows.push(NodeRow {
                labels: info.labels_excluding(&node.name),
                executors: info.num_executors,
                offline: node.offline,
                name: node.name,
            });
        }
        Ok(rows)
    }
}
