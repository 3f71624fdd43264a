//! PipelineRun client errors

use thiserror::Error;

/// Errors that can occur when reading PipelineRuns from the cluster
#[derive(Debug, Error)]
pub enum ClientError {
    /// Kubernetes client could not be configured
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The named PipelineRun does not exist
    #[error("PipelineRun not found: {0}")]
    NotFound(String),

    /// The API server refused the request (bad selector, RBAC, missing CRD, ...)
    #[error("PipelineRun API rejected request ({code}): {message}")]
    Rejected {
        /// HTTP status code
        code: u16,
        /// Server message
        message: String,
    },

    /// The API could not answer right now
    #[error("PipelineRun API unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Classify an API server status response.
    ///
    /// 408 and 429 are worth retrying like any 5xx; every other 4xx will fail
    /// the same way next time.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            404 => ClientError::NotFound(message),
            408 | 429 => ClientError::Unavailable(format!("{code}: {message}")),
            400..=499 => ClientError::Rejected { code, message },
            _ => ClientError::Unavailable(format!("{code}: {message}")),
        }
    }

    /// Whether the error reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Whether a later request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Unavailable(_))
    }
}
