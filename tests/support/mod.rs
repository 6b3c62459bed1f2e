// ABOUTME: Test support utilities.
// ABOUTME: Provides an in-memory provider API, fixtures, and tracing setup for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use pages_deployer::api::{ApiError, IdTokenError, IdTokenProvider, PagesApi, ResponseBody};
use pages_deployer::config::{Config, Inputs, Secret};
use pages_deployer::types::{
    Artifact, ArtifactId, ArtifactRun, Deployment, DeploymentRequest, DeploymentStatus,
    RunArtifact, RunId, Workflow, WorkflowId, WorkflowRun,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("pages_deployer=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const API_URL: &str = "https://api.test";
pub const RUNTIME_URL: &str = "https://runtime.test/";
pub const REPOSITORY: &str = "octo/site";
pub const BUILD_VERSION: &str = "abc123";

/// Inputs for a run where every required value is present.
pub fn inputs() -> Inputs {
    Inputs {
        artifact_name: Some("github-pages".into()),
        repo: Some(REPOSITORY.into()),
        timeout: Some("600000".into()),
        reporting_interval: Some("5000".into()),
        error_count: Some("10".into()),
        token: Some("ghs_token".into()),
        id_token: Some("oidc_token".into()),
        build_version: Some(BUILD_VERSION.into()),
        actor: Some("octocat".into()),
        action: Some("__deploy".into()),
        api_url: Some(API_URL.into()),
        runtime_url: Some(RUNTIME_URL.into()),
        ..Inputs::default()
    }
}

pub fn config() -> Config {
    Config::from_inputs(inputs()).unwrap()
}

pub fn cancel_url() -> String {
    format!("{API_URL}/repos/{REPOSITORY}/pages/deployment/cancel/{BUILD_VERSION}")
}

pub fn status_url() -> String {
    format!("{API_URL}/repos/{REPOSITORY}/pages/deployment/status/{BUILD_VERSION}")
}

pub fn workflow(id: u64, name: &str, path: &str) -> Workflow {
    Workflow {
        id: WorkflowId::new(id),
        name: name.to_string(),
        path: path.to_string(),
    }
}

pub fn run(id: u64, workflow_id: u64) -> WorkflowRun {
    WorkflowRun {
        id: RunId::new(id),
        workflow_id: WorkflowId::new(workflow_id),
    }
}

pub fn artifact(id: u64, name: &str, run_id: u64, branch: &str) -> Artifact {
    Artifact {
        id: ArtifactId::new(id),
        name: name.to_string(),
        size_in_bytes: 2_500_000,
        url: format!("{API_URL}/repos/{REPOSITORY}/actions/artifacts/{id}"),
        workflow_run: Some(ArtifactRun {
            id: RunId::new(run_id),
            head_branch: Some(branch.to_string()),
            head_sha: Some(BUILD_VERSION.to_string()),
        }),
    }
}

pub fn run_artifact(name: &str, url: &str) -> RunArtifact {
    RunArtifact {
        name: name.to_string(),
        url: url.to_string(),
    }
}

pub fn deployment(status_url: &str) -> Deployment {
    Deployment {
        status_url: status_url.to_string(),
        page_url: "https://octo.github.io/site/".to_string(),
        preview_url: None,
    }
}

/// An HTTP error response with a JSON body.
pub fn http_error(status: u16, body: &str) -> ApiError {
    ApiError::Status {
        url: format!("{API_URL}/repos/{REPOSITORY}/pages/deployment"),
        status,
        body: ResponseBody::parse(body),
    }
}

/// A call that produced no usable response.
pub fn unreachable(url: &str) -> ApiError {
    let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
    ApiError::Decode {
        url: url.to_string(),
        source,
    }
}

/// One scripted answer of the status endpoint.
pub enum StatusReply {
    Status(DeploymentStatus),
    Unreachable,
}

pub fn named(status: &str) -> StatusReply {
    StatusReply::Status(DeploymentStatus::named(status))
}

/// Counts of calls made against the mock.
#[derive(Default)]
pub struct Calls {
    pub workflows: AtomicUsize,
    pub workflow_runs: AtomicUsize,
    pub artifacts: AtomicUsize,
    pub run_artifacts: AtomicUsize,
    pub create: AtomicUsize,
    pub status: AtomicUsize,
    pub cancel: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-memory provider with scripted listings and status sequences.
///
/// Once the scripted statuses run out the deployment reports
/// `deployment_in_progress` forever.
#[derive(Default)]
pub struct MockApi {
    pub workflows: Vec<Workflow>,
    pub runs: Vec<WorkflowRun>,
    pub artifacts: Vec<Artifact>,
    pub run_artifacts: Vec<RunArtifact>,
    pub calls: Calls,
    pub create_error: Mutex<Option<ApiError>>,
    pub created: Mutex<Option<Deployment>>,
    pub statuses: Mutex<VecDeque<StatusReply>>,
    pub cancel_error: Mutex<Option<ApiError>>,
    pub requests: Mutex<Vec<DeploymentRequest>>,
    pub status_urls: Mutex<Vec<String>>,
    pub cancel_urls: Mutex<Vec<String>>,
}

impl MockApi {
    /// A provider holding one deployable artifact for the default config.
    pub fn with_site() -> Self {
        Self {
            artifacts: vec![artifact(7, "github-pages", 42, "main")],
            run_artifacts: vec![run_artifact(
                "github-pages",
                "https://runtime.test/_apis/resources/Containers/7",
            )],
            ..Self::default()
        }
    }

    pub fn statuses(self, replies: impl IntoIterator<Item = StatusReply>) -> Self {
        self.statuses.lock().unwrap().extend(replies);
        self
    }

    pub fn created(self, deployment: Deployment) -> Self {
        *self.created.lock().unwrap() = Some(deployment);
        self
    }

    pub fn failing_create(self, error: ApiError) -> Self {
        *self.create_error.lock().unwrap() = Some(error);
        self
    }

    pub fn failing_cancel(self, error: ApiError) -> Self {
        *self.cancel_error.lock().unwrap() = Some(error);
        self
    }

    pub fn requests(&self) -> Vec<DeploymentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn status_urls(&self) -> Vec<String> {
        self.status_urls.lock().unwrap().clone()
    }

    pub fn cancel_urls(&self) -> Vec<String> {
        self.cancel_urls.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        Calls::get(&self.calls.cancel)
    }

    pub fn status_count(&self) -> usize {
        Calls::get(&self.calls.status)
    }
}

#[async_trait]
impl PagesApi for MockApi {
    async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError> {
        self.calls.workflows.fetch_add(1, Ordering::SeqCst);
        Ok(self.workflows.clone())
    }

    async fn list_workflow_runs(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<Vec<WorkflowRun>, ApiError> {
        self.calls.workflow_runs.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .runs
            .iter()
            .filter(|run| run.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    async fn list_artifacts(&self) -> Result<Vec<Artifact>, ApiError> {
        self.calls.artifacts.fetch_add(1, Ordering::SeqCst);
        Ok(self.artifacts.clone())
    }

    async fn list_run_artifacts(&self, _run_id: RunId) -> Result<Vec<RunArtifact>, ApiError> {
        self.calls.run_artifacts.fetch_add(1, Ordering::SeqCst);
        Ok(self.run_artifacts.clone())
    }

    async fn create_deployment(
        &self,
        _url: &str,
        request: &DeploymentRequest,
    ) -> Result<Deployment, ApiError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = self.create_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self
            .created
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| deployment("")))
    }

    async fn deployment_status(&self, url: &str) -> Result<DeploymentStatus, ApiError> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        self.status_urls.lock().unwrap().push(url.to_string());
        match self.statuses.lock().unwrap().pop_front() {
            Some(StatusReply::Status(status)) => Ok(status),
            Some(StatusReply::Unreachable) => Err(unreachable(url)),
            None => Ok(DeploymentStatus::named("deployment_in_progress")),
        }
    }

    async fn cancel_deployment(&self, url: &str) -> Result<(), ApiError> {
        self.calls.cancel.fetch_add(1, Ordering::SeqCst);
        self.cancel_urls.lock().unwrap().push(url.to_string());
        match self.cancel_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Identity token provider with a fixed answer.
pub struct FixedIdToken(pub Option<&'static str>);

#[async_trait]
impl IdTokenProvider for FixedIdToken {
    async fn id_token(&self) -> Result<Secret, IdTokenError> {
        self.0.map(Secret::new).ok_or(IdTokenError::NotConfigured)
    }
}
