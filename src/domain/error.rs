//! Domain-level errors

use thiserror::Error;

/// Domain errors represent invalid user input to the selection logic.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
