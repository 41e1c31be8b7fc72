//! Error types for the harbormaster control plane

use thiserror::Error;

/// Coarse classification used by the HTTP layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unavailable,
    Remote,
    Template,
    Persistence,
    Invalid,
    Internal,
}

/// Main error type for harbormaster
#[derive(Error, Debug)]
pub enum HarborError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Build server unavailable: {0}")]
    Unavailable(String),

    #[error("Build server error: {0}")]
    RemoteError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error(
        "Job '{job}' was created on the build server but the project could not be saved to the registry: {reason}"
    )]
    JobNotRegistered { job: String, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Container engine error: {0}")]
    ContainerError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HarborError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarborError::NotFound(_) => ErrorKind::NotFound,
            HarborError::Unavailable(_) => ErrorKind::Unavailable,
            HarborError::RemoteError(_) | HarborError::HttpError(_) => ErrorKind::Remote,
            HarborError::TemplateError(_) => ErrorKind::Template,
            HarborError::PersistenceError(_) | HarborError::JobNotRegistered { .. } => {
                ErrorKind::Persistence
            }
            HarborError::ValidationError(_) => ErrorKind::Invalid,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<anyhow::Error> for HarborError {
    fn from(err: anyhow::Error) -> Self {
        HarborError::Internal(err.to_string())
    }
}
