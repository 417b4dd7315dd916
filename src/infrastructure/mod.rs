//! Infrastructure layer: Jenkins remote API and DI container
//!
//! This layer implements the remote API boundary trait and wires up services.

pub mod di;
pub mod error;
pub mod jenkins;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use jenkins::JenkinsClient;
pub use traits::JenkinsApi;
