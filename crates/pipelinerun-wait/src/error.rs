//! Error types for `pipelinerun-wait`.
//!
//! Client failures come from `pipelinerun-client`; everything else that can
//! stop the tool before a terminal poll outcome is defined here.

use pipelinerun_client::ClientError;
use thiserror::Error;

/// Exit code for runtime failures that are not a poll outcome
pub const EXIT_FATAL: u8 = 1;

/// Exit code for invalid, missing or conflicting flags (and `-h`)
pub const EXIT_USAGE: u8 = 2;

/// Errors that can occur while waiting for PipelineRuns.
#[derive(Debug, Error)]
pub enum WaitError {
    /// Neither or both of name and labels were given
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A `-l` value that is not `KEY=VALUE`
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// Cluster client error that is fatal to the run
    #[error("PipelineRun client error: {0}")]
    Client(#[from] ClientError),

    /// The named PipelineRun does not exist (or was deleted mid-poll)
    #[error("PipelineRun not found: {0}")]
    ResourceNotFound(String),

    /// A `-t` value the deadline cannot represent
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Writing the status report failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Conditions could not be rendered for the summary
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WaitError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            WaitError::InvalidSelector(_)
            | WaitError::InvalidLabel(_)
            | WaitError::InvalidTimeout(_) => EXIT_USAGE,
            _ => EXIT_FATAL,
        }
    }
}
