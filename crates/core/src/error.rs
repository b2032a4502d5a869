// Central Error Type for the Client

use crate::domain::DomainError;
use std::time::Duration;
use thiserror::Error;

/// Client-level error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Missing configuration means "inconclusive", not a functional failure
    pub fn is_not_configured(&self) -> bool {
        matches!(self, ClientError::NotConfigured(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict(_))
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        ClientError::InvalidArgument(err.to_string())
    }
}

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
