//! CLI layer: argument parsing, command dispatch and output

pub mod args;
pub mod commands;
pub mod error;
pub mod output;

pub use args::{Cli, Commands};
pub use commands::{execute_command, execute_with};
pub use error::{CliError, CliResult};
