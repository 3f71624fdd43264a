//! PipelineRunClient trait for mocking
//!
//! This trait abstracts cluster access so the poller can be tested against
//! scripted snapshots. The concrete `PipelineRunClient` implements it.

use crate::error::ClientError;
use crds::PipelineRun;

/// Trait for PipelineRun read operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait PipelineRunClientTrait: Send + Sync {
    /// Namespace the client reads from
    fn namespace(&self) -> &str;

    /// Fetch exactly one PipelineRun by name.
    ///
    /// Returns `ClientError::NotFound` when no such run exists.
    async fn get(&self, name: &str) -> Result<PipelineRun, ClientError>;

    /// List every PipelineRun carrying all of the given `key=value` labels.
    ///
    /// An empty result is not an error.
    async fn list(&self, labels: &[(String, String)]) -> Result<Vec<PipelineRun>, ClientError>;
}
