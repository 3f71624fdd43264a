//! PipelineRun CRD
//!
//! A single execution of a Tekton pipeline (`tekton.dev/v1`).

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired state of a PipelineRun
#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "tekton.dev",
    version = "v1",
    kind = "PipelineRun",
    namespaced,
    status = "PipelineRunStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    /// Pipeline being executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_ref: Option<PipelineRef>,

    /// Parameters passed to the pipeline
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
}

/// Reference to the Pipeline a run executes
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRef {
    /// Name of an in-cluster Pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Remote resolver (git, bundles, hub, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
}

/// Named pipeline parameter
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,

    /// String, array or object value
    pub value: serde_json::Value,
}

/// Observed state of a PipelineRun
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    /// Conditions, most recent first. Tekton only ever sets the `Succeeded` condition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// When the run started executing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,

    /// When the run reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Knative-style status condition as reported by Tekton
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type, `Succeeded` for PipelineRuns
    #[serde(rename = "type", default)]
    pub condition_type: String,

    /// `True`, `False` or `Unknown`
    #[serde(default)]
    pub status: String,

    /// Machine-readable reason (`Running`, `Succeeded`, `Failed`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// When the condition last changed status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl PipelineRun {
    /// All reported conditions, empty when the run has no status yet.
    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map_or(&[], |status| status.conditions.as_slice())
    }

    /// The first (most recent) condition.
    pub fn latest_condition(&self) -> Option<&Condition> {
        self.conditions().first()
    }

    /// Reason of the most recent condition. An empty reason counts as absent.
    pub fn latest_reason(&self) -> Option<&str> {
        self.latest_condition()?
            .reason
            .as_deref()
            .filter(|reason| !reason.is_empty())
    }
}
