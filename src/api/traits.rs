// ABOUTME: Capability traits for the hosting provider and identity token issuer.
// ABOUTME: Pure I/O contracts; every decision lives in the callers.

use async_trait::async_trait;

use super::error::ApiError;
use crate::config::Secret;
use crate::types::{
    Artifact, Deployment, DeploymentRequest, DeploymentStatus, RunArtifact, RunId, Workflow,
    WorkflowId, WorkflowRun,
};

/// Provider endpoints used to locate an artifact and drive its deployment.
///
/// Implementations are bound to one repository. Listings return a single
/// page of up to 100 entries and never follow pagination cursors.
#[async_trait]
pub trait PagesApi: Send + Sync {
    /// List the repository's workflows.
    async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError>;

    /// List recent runs of one workflow.
    async fn list_workflow_runs(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<WorkflowRun>, ApiError>;

    /// List the repository's most recent artifacts.
    async fn list_artifacts(&self) -> Result<Vec<Artifact>, ApiError>;

    /// List artifacts of one run as known to the pipeline runtime service.
    async fn list_run_artifacts(&self, run_id: RunId) -> Result<Vec<RunArtifact>, ApiError>;

    /// Submit a deployment request.
    async fn create_deployment(
        &self,
        url: &str,
        request: &DeploymentRequest,
    ) -> Result<Deployment, ApiError>;

    /// Fetch the current status of a deployment.
    async fn deployment_status(&self, url: &str) -> Result<DeploymentStatus, ApiError>;

    /// Ask the provider to abort the in-flight deployment.
    async fn cancel_deployment(&self, url: &str) -> Result<(), ApiError>;
}

/// Issues the short-lived identity token presented with a deployment.
#[async_trait]
pub trait IdTokenProvider: Send + Sync {
    async fn id_token(&self) -> Result<Secret, IdTokenError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdTokenError {
    #[error("no identity token source is configured")]
    NotConfigured,

    #[error("identity token request failed: {0}")]
    Request(#[from] ApiError),

    #[error("identity token response did not contain a token")]
    Empty,
}
