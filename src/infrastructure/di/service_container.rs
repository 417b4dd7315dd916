//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{BuildService, JobService, NodeService};
use crate::domain::Profile;
use crate::infrastructure::{InfraResult, JenkinsApi, JenkinsClient};

/// Services sharing one remote API.
pub struct ServiceContainer {
    pub jobs: JobService,
    pub nodes: NodeService,
    pub builds: BuildService,
}

impl ServiceContainer {
    /// Create a service container talking to the server named in `profile`.
    pub fn new(profile: &Profile) -> InfraResult<Self> {
        let client = JenkinsClient::new(profile)?;
        debug!("connecting to {} as {}", client.base_url(), profile.username);
        Ok(Self::with_deps(Arc::new(client)))
    }

    /// Create a service container with a custom remote API (for testing).
    pub fn with_deps(api: Arc<dyn JenkinsApi>) -> Self {
        Self {
            jobs: JobService::new(Arc::clone(&api)),
            nodes: NodeService::new(Arc::clone(&api)),
            builds: BuildService::new(api),
        }
    }
}
