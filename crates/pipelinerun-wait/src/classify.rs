//! Condition classification.
//!
//! Maps the reason of a PipelineRun's most recent condition onto the coarse
//! state the poller aggregates over. Matching is exact and case-sensitive.

use crds::PipelineRun;
use std::fmt;

/// Coarse state of a single PipelineRun
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// No condition, or a condition without a reason
    NoCondition,
    /// Pipeline or task references are still being resolved
    Init(String),
    Running,
    Succeeded,
    Failed,
    /// Any reason outside the table, kept verbatim
    Unknown(String),
}

impl RunState {
    /// Whether the run reached a terminal state.
    pub fn is_done(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::NoCondition => write!(f, "no condition yet"),
            RunState::Init(reason) => write!(f, "initializing ({reason})"),
            RunState::Running => write!(f, "running"),
            RunState::Succeeded => write!(f, "succeeded"),
            RunState::Failed => write!(f, "failed"),
            RunState::Unknown(reason) => write!(f, "unknown reason \"{reason}\""),
        }
    }
}

/// Classify a condition reason.
pub fn classify(reason: Option<&str>) -> RunState {
    match reason {
        None | Some("") => RunState::NoCondition,
        Some(reason @ ("ResolvingPipelineRef" | "ResolvingTaskRef")) => {
            RunState::Init(reason.to_string())
        }
        Some("Running") => RunState::Running,
        Some("Succeeded") => RunState::Succeeded,
        Some("Failed") => RunState::Failed,
        Some(other) => RunState::Unknown(other.to_string()),
    }
}

/// A PipelineRun name paired with its classified state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRun {
    pub name: String,
    pub state: RunState,
}

/// Classify one fetched PipelineRun from its latest condition.
pub fn classify_run(run: &PipelineRun) -> ClassifiedRun {
    ClassifiedRun {
        name: run.metadata.name.clone().unwrap_or_else(|| "<unknown>".to_string()),
        state: classify(run.latest_reason()),
    }
}
