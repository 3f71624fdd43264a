//! Mock PipelineRunClient for unit testing
//!
//! Replays a scripted sequence of snapshots, one per fetch, so poll loops can
//! be driven deterministically without a cluster. Once the script runs out the
//! last entry repeats forever.

use crate::client_trait::PipelineRunClientTrait;
use crate::error::ClientError;
use crds::{Condition, PipelineRun, PipelineRunSpec, PipelineRunStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One scripted answer of the mock
#[derive(Debug, Clone)]
enum Scripted {
    Snapshot(Vec<PipelineRun>),
    NotFound,
    Unavailable(String),
    Status(u16, String),
}

/// Fetch recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `get` with the requested name
    Get(String),
    /// `list` with the requested labels
    List(Vec<(String, String)>),
}

/// Mock PipelineRunClient for testing
#[derive(Debug, Clone)]
pub struct MockPipelineRunClient {
    namespace: String,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    last: Arc<Mutex<Option<Scripted>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockPipelineRunClient {
    /// Create a mock with an empty script
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue the snapshot returned by the next fetch
    pub fn push_snapshot(&self, runs: Vec<PipelineRun>) -> &Self {
        lock(&self.script).push_back(Scripted::Snapshot(runs));
        self
    }

    /// Queue a `NotFound` answer
    pub fn push_not_found(&self) -> &Self {
        lock(&self.script).push_back(Scripted::NotFound);
        self
    }

    /// Queue a transient API failure
    pub fn push_unavailable(&self, message: impl Into<String>) -> &Self {
        lock(&self.script).push_back(Scripted::Unavailable(message.into()));
        self
    }

    /// Queue an API status response, classified like a real one
    pub fn push_api_error(&self, code: u16, message: impl Into<String>) -> &Self {
        lock(&self.script).push_back(Scripted::Status(code, message.into()));
        self
    }

    /// Every fetch made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn next(&self) -> Scripted {
        let popped = lock(&self.script).pop_front();
        let mut last = lock(&self.last);
        if let Some(entry) = popped {
            *last = Some(entry.clone());
            entry
        } else {
            last.clone().unwrap_or(Scripted::Snapshot(Vec::new()))
        }
    }
}

#[async_trait::async_trait]
impl PipelineRunClientTrait for MockPipelineRunClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, name: &str) -> Result<PipelineRun, ClientError> {
        lock(&self.calls).push(MockCall::Get(name.to_string()));

        match self.next() {
            Scripted::Snapshot(runs) => runs
                .into_iter()
                .find(|run| run.metadata.name.as_deref() == Some(name))
                .ok_or_else(|| ClientError::NotFound(format!("{}/{}", self.namespace, name))),
            Scripted::NotFound => Err(ClientError::NotFound(format!("{}/{}", self.namespace, name))),
            Scripted::Unavailable(message) => Err(ClientError::Unavailable(message)),
            Scripted::Status(code, message) => Err(ClientError::from_status(code, message)),
        }
    }

    async fn list(&self, labels: &[(String, String)]) -> Result<Vec<PipelineRun>, ClientError> {
        lock(&self.calls).push(MockCall::List(labels.to_vec()));

        match self.next() {
            Scripted::Snapshot(runs) => Ok(runs),
            Scripted::NotFound => Ok(Vec::new()),
            Scripted::Unavailable(message) => Err(ClientError::Unavailable(message)),
            Scripted::Status(code, message) => Err(ClientError::from_status(code, message)),
        }
    }
}

/// Build a PipelineRun whose latest condition carries `reason`.
///
/// `None` produces a run without any status, as Tekton reports right after creation.
pub fn pipeline_run(name: &str, reason: Option<&str>) -> PipelineRun {
    let status = reason.map(|reason| {
        let condition_status = match reason {
            "Succeeded" => "True",
            "Failed" => "False",
            _ => "Unknown",
        };
        PipelineRunStatus {
            conditions: vec![Condition {
                condition_type: "Succeeded".to_string(),
                status: condition_status.to_string(),
                reason: Some(reason.to_string()),
                message: None,
                last_transition_time: None,
            }],
            ..Default::default()
        }
    });

    PipelineRun {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: PipelineRunSpec::default(),
        status,
    }
}
