use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to decode scheduler response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("Failed to set up logging: {0}")]
    Telemetry(String),
}

/// Problems with the command line, detected before the scheduler is contacted.
#[derive(Error, Debug, PartialEq)]
pub enum UsageError {
    #[error("No job identification provided")]
    NoJobIdentification,

    #[error("Unknown job signal: {0}")]
    UnknownSignal(String),

    #[error("Invalid job state specified: {0}")]
    InvalidState(String),

    #[error("Invalid job id specified: {0}")]
    InvalidJobId(String),

    #[error("Invalid node list specified: {0}")]
    InvalidHostlist(String),
}

/// Per-job result of a cancel or signal request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Access/permission denied")]
    PermissionDenied,

    #[error("Invalid job id specified")]
    NotFound,

    #[error("{0}")]
    Fault(String),
}

impl MutationError {
    /// Map the scheduler client's error text to an outcome.
    pub fn classify(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        if ["operation not permitted", "permission denied", "eperm"]
            .iter()
            .any(|m| lower.contains(m))
        {
            MutationError::PermissionDenied
        } else if [
            "no such file or directory",
            "unknown job id",
            "enoent",
            "not found",
        ]
        .iter()
        .any(|m| lower.contains(m))
        {
            MutationError::NotFound
        } else {
            MutationError::Fault(stderr.trim().to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
