//! Kubernetes PipelineRun client
//!
//! Reads `tekton.dev/v1` PipelineRuns through the kube-rs typed API.

use crate::client_trait::PipelineRunClientTrait;
use crate::error::ClientError;
use crds::PipelineRun;
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::debug;

/// PipelineRun API client bound to a single namespace
pub struct PipelineRunClient {
    api: Api<PipelineRun>,
    namespace: String,
}

impl std::fmt::Debug for PipelineRunClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunClient")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// Map a request error onto the client's retry semantics.
///
/// API status responses are classified by code; anything else (connect,
/// TLS, decode) is treated as transient.
fn request_error(err: kube::Error) -> ClientError {
    match err {
        kube::Error::Api(status) => ClientError::from_status(status.code, status.message.clone()),
        other => ClientError::Unavailable(other.to_string()),
    }
}

impl PipelineRunClient {
    /// Create a client from an existing kube client.
    ///
    /// # Arguments
    /// * `client` - Kubernetes client
    /// * `namespace` - Namespace to read from; `None` uses the client's default namespace
    pub fn new(client: Client, namespace: Option<&str>) -> Self {
        let namespace = namespace
            .map_or_else(|| client.default_namespace().to_string(), str::to_string);
        let api = Api::namespaced(client, &namespace);

        Self { api, namespace }
    }

    /// Create a client from the ambient kubeconfig or in-cluster configuration.
    pub async fn try_default(namespace: Option<&str>) -> Result<Self, ClientError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client, namespace))
    }
}

/// Join label pairs into a Kubernetes equality selector (`a=1,b=2`).
///
/// The API server ANDs the comma-separated requirements.
pub fn label_selector(labels: &[(String, String)]) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait::async_trait]
impl PipelineRunClientTrait for PipelineRunClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, name: &str) -> Result<PipelineRun, ClientError> {
        debug!("Getting PipelineRun {}/{}", self.namespace, name);

        self.api
            .get_opt(name)
            .await
            .map_err(request_error)?
            .ok_or_else(|| ClientError::NotFound(format!("{}/{}", self.namespace, name)))
    }

    async fn list(&self, labels: &[(String, String)]) -> Result<Vec<PipelineRun>, ClientError> {
        let selector = label_selector(labels);
        debug!("Listing PipelineRuns in {} with selector {}", self.namespace, selector);

        let params = ListParams::default().labels(&selector);
        let runs = self.api.list(&params).await.map_err(request_error)?;

        Ok(runs.items)
    }
}
