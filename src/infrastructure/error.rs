//! Infrastructure-level errors (remote API and transport)

use thiserror::Error;

/// Failures talking to the Jenkins server. They are not retried.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{method} {url} failed with status {status}")]
    Http {
        method: &'static str,
        url: String,
        status: u16,
    },

    #[error("request failed: {context}")]
    Request {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot decode response: {context}")]
    Decode {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("{0}")]
    Client(String),
}

impl InfraError {
    /// Create a transport error with context.
    pub fn request(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            context: context.into(),
            source,
        }
    }

    /// Create a decode error with context.
    pub fn decode(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// HTTP status of the failed response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
