//! Tekton CRD Definitions
//!
//! Typed views of the Tekton resources consumed by `pipelinerun-wait`.
//! Tekton owns these CRDs; only the fields this workspace reads are modelled,
//! everything else is ignored on deserialize.

pub mod pipeline_run;

pub use pipeline_run::*;
