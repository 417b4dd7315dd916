//! Remote API boundary trait for testability
//!
//! Services talk to Jenkins only through [`JenkinsApi`], so they can be tested
//! with an in-memory implementation.

use crate::domain::{BuildInfo, Job, JobInfo, Node, NodeInfo, RunningBuild};
use crate::infrastructure::InfraResult;

/// Blocking Jenkins remote API.
///
/// Job names are full names: folder path and job name joined by `/`.
pub trait JenkinsApi: Send + Sync {
    /// List jobs, descending `folder_depth` levels into folders.
    ///
    /// Folders are listed too, before their children.
    fn get_jobs(&self, folder_depth: usize) -> InfraResult<Vec<Job>>;

    /// Detailed information about one job.
    fn get_job_info(&self, name: &str) -> InfraResult<JobInfo>;

    /// Raw `config.xml` of one job.
    fn get_job_config(&self, name: &str) -> InfraResult<String>;

    /// Whether a job with this full name exists.
    fn job_exists(&self, name: &str) -> InfraResult<bool>;

    fn disable_job(&self, name: &str) -> InfraResult<()>;

    fn delete_job(&self, name: &str) -> InfraResult<()>;

    /// Copy `from` to `to`. Both must live in the same folder.
    fn copy_job(&self, from: &str, to: &str) -> InfraResult<()>;

    /// List all nodes, including the built-in one.
    fn get_nodes(&self) -> InfraResult<Vec<Node>>;

    /// Whether a node with this name still exists.
    fn node_exists(&self, name: &str) -> InfraResult<bool>;

    fn get_node_info(&self, name: &str) -> InfraResult<NodeInfo>;

    /// Builds currently running on any executor of any node.
    fn get_running_builds(&self) -> InfraResult<Vec<RunningBuild>>;

    fn get_build_info(&self, build: &RunningBuild) -> InfraResult<BuildInfo>;
}
