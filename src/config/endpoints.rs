// ABOUTME: URL builder for the provider REST API and the pipeline runtime service.
// ABOUTME: Every remote path the deployer touches is derived here from configuration.

use urlencoding::encode;

use crate::types::{Repository, RunId, WorkflowId};

/// Listing calls fetch a single page of this size; no cursor following.
pub const PAGE_SIZE: u32 = 100;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_url: String,
    runtime_url: String,
    repository: Repository,
    build_version: String,
}

impl Endpoints {
    pub fn new(
        api_url: &str,
        runtime_url: &str,
        repository: Repository,
        build_version: &str,
    ) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            runtime_url: runtime_url.to_string(),
            repository,
            build_version: build_version.to_string(),
        }
    }

    fn repo_base(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url,
            encode(self.repository.owner()),
            encode(self.repository.name())
        )
    }

    pub fn workflows(&self) -> String {
        format!("{}/actions/workflows?per_page={PAGE_SIZE}", self.repo_base())
    }

    pub fn workflow_runs(&self, workflow_id: WorkflowId) -> String {
        format!(
            "{}/actions/workflows/{workflow_id}/runs?per_page={PAGE_SIZE}",
            self.repo_base()
        )
    }

    pub fn artifacts(&self) -> String {
        format!("{}/actions/artifacts?per_page={PAGE_SIZE}", self.repo_base())
    }

    /// Artifacts of one run as seen by the pipeline runtime service.
    pub fn run_artifacts(&self, run_id: RunId) -> String {
        // The runtime URL carries its own trailing slash.
        format!(
            "{}_apis/pipelines/workflows/{run_id}/artifacts?api-version=6.0-preview",
            self.runtime_url
        )
    }

    pub fn deployment(&self) -> String {
        format!("{}/pages/deployment", self.repo_base())
    }

    /// Status URL used when the created deployment does not provide one.
    pub fn deployment_status(&self) -> String {
        format!(
            "{}/pages/deployment/status/{}",
            self.repo_base(),
            encode(&self.build_version)
        )
    }

    pub fn deployment_cancel(&self) -> String {
        format!(
            "{}/pages/deployment/cancel/{}",
            self.repo_base(),
            encode(&self.build_version)
        )
    }
}
