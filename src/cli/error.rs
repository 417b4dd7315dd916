//! CLI-level errors (wraps configuration, application and infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::config::ConfigError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(#[from] DomainError),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => crate::exitcode::CONFIG,
            CliError::InvalidArgs(_) => crate::exitcode::FAILURE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_) => crate::exitcode::FAILURE,
                ApplicationError::Remote(_) => crate::exitcode::REMOTE,
            },
            CliError::Infra(_) => crate::exitcode::REMOTE,
            CliError::Output(_) => crate::exitcode::FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_config_error_when_mapping_exit_code_then_one() {
        let err = CliError::from(ConfigError::FileMissing(PathBuf::from("/x.ini")));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn given_remote_error_when_mapping_exit_code_then_one() {
        let err = CliError::from(ApplicationError::from(InfraError::Client("boom".into())));
        assert_eq!(err.exit_code(), 1);
    }
}
