// ABOUTME: Artifact selection criteria and the pure first-match filter.
// ABOUTME: Workflow and branch filters are optional; the name match is always applied.

use crate::config::Config;
use crate::types::{Artifact, RunId};

/// What the deployer is looking for among the listed artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFilter {
    /// Exact, case-sensitive artifact name.
    pub name: String,
    /// Required head branch of the producing run.
    pub branch: Option<String>,
    /// Workflow the producing run must belong to.
    pub workflow: Option<String>,
}

impl ArtifactFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch: None,
            workflow: None,
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn workflow(mut self, workflow: impl Into<String>) -> Self {
        self.workflow = Some(workflow.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.artifact_name.clone(),
            branch: config.branch.clone(),
            workflow: config.workflow_name.clone(),
        }
    }

    /// Whether `artifact` passes every active filter.
    pub fn accepts(&self, artifact: &Artifact, allowed_runs: &[RunId]) -> bool {
        if self.workflow.is_some() {
            let in_workflow = artifact
                .run_id()
                .is_some_and(|run| allowed_runs.contains(&run));
            if !in_workflow {
                return false;
            }
        }

        if let Some(branch) = &self.branch {
            if artifact.head_branch() != Some(branch.as_str()) {
                return false;
            }
        }

        artifact.name == self.name
    }
}

/// First artifact in listing order that passes every active filter.
///
/// `allowed_runs` only matters when a workflow filter is set.
pub fn find_artifact<'a>(
    artifacts: &'a [Artifact],
    allowed_runs: &[RunId],
    filter: &ArtifactFilter,
) -> Option<&'a Artifact> {
    artifacts
        .iter()
        .find(|artifact| filter.accepts(artifact, allowed_runs))
}
