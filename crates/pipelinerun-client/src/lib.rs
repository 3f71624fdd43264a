//! PipelineRun API Client
//!
//! Reads Tekton `PipelineRun` resources from a Kubernetes cluster, either a
//! single run by name or every run matching a label selector.
//!
//! # Example
//!
//! ```no_run
//! use pipelinerun_client::{PipelineRunClient, PipelineRunClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PipelineRunClient::try_default(Some("ci")).await?;
//!
//! let run = client.get("build-1").await?;
//! let runs = client
//!     .list(&[("app".to_string(), "ci".to_string())])
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! The `test-util` feature exposes [`MockPipelineRunClient`], which replays
//! scripted snapshots instead of talking to a cluster.

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod client_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{label_selector, PipelineRunClient};
pub use client_trait::PipelineRunClientTrait;
pub use error::ClientError;
#[cfg(feature = "test-util")]
pub use mock::{pipeline_run, MockCall, MockPipelineRunClient};
