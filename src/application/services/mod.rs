//! Application services

pub mod builds;
pub mod jobs;
pub mod nodes;

pub use builds::{BuildService, RunningBuildRow};
pub use jobs::{JobEvent, JobSelector, JobService};
pub use nodes::{NodeRow, NodeService};
