//! jentool: list, filter and mutate the jobs and nodes of a Jenkins server.
//!
//! Layers, from the inside out:
//! - [`domain`]: entities and name selection, no I/O
//! - [`infrastructure`]: the Jenkins REST client behind [`infrastructure::JenkinsApi`]
//! - [`application`]: job, node and build services
//! - [`cli`]: argument parsing, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
