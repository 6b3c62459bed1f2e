// ABOUTME: Resolves the artifact to deploy from workflows, runs, and artifact listings.
// ABOUTME: Short-circuits with explicit errors when a configured workflow has no match.

use tracing::info;

use super::filter::{ArtifactFilter, find_artifact};
use super::size::format_size;
use crate::api::{ApiError, PagesApi};
use crate::types::{Artifact, RunId, WorkflowId};

/// Query suffix that makes the runtime service hand out the artifact content.
const SIGNED_CONTENT_QUERY: &str = "?%24expand=SignedContent";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Workflow {0} could not be found in the current repository.")]
    WorkflowNotFound(String),

    #[error("Could not find workflow runs for workflow \"{0}\"")]
    NoWorkflowRunsFound(String),

    #[error("Artifact named \"{0}\" does not exist.")]
    ArtifactNotFound(String),

    #[error(
        "No uploaded artifact was found! Please check if there are any errors at build step, or uploaded artifact name is correct."
    )]
    NoArtifactUrl,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Resolve a configured workflow name to its id.
///
/// Returns `None` without calling the API when no name is configured. Matches
/// by display name or path tail; the first match in listing order wins.
pub async fn resolve_workflow_id<A: PagesApi + ?Sized>(
    api: &A,
    name: Option<&str>,
) -> Result<Option<WorkflowId>, ApiError> {
    let Some(name) = name else {
        return Ok(None);
    };

    let workflows = api.list_workflows().await?;

    Ok(workflows
        .iter()
        .find(|workflow| workflow.matches(name))
        .map(|workflow| workflow.id))
}

/// Run the full lookup: workflow, its runs, the artifact listing, then filtering.
///
/// `Ok(None)` means the listings were fetched but nothing matched; the caller
/// decides whether that is fatal.
pub async fn find_target_artifact<A: PagesApi + ?Sized>(
    api: &A,
    filter: &ArtifactFilter,
) -> Result<Option<Artifact>, ResolveError> {
    info!("==> Artifact: {}", filter.name);
    if let Some(workflow) = &filter.workflow {
        info!("==> Workflow: {workflow}");
    }
    if let Some(branch) = &filter.branch {
        info!("==> Branch: {branch}");
    }

    let workflow_id = resolve_workflow_id(api, filter.workflow.as_deref()).await?;

    let runs: Vec<RunId> = match (&filter.workflow, workflow_id) {
        (Some(name), None) => return Err(ResolveError::WorkflowNotFound(name.clone())),
        (Some(name), Some(id)) => {
            let runs: Vec<RunId> = api
                .list_workflow_runs(id)
                .await?
                .into_iter()
                .map(|run| run.id)
                .collect();
            if runs.is_empty() {
                return Err(ResolveError::NoWorkflowRunsFound(name.clone()));
            }
            runs
        }
        (None, _) => Vec::new(),
    };

    let artifacts = api.list_artifacts().await?;
    info!("==> Found {} artifacts, searching...", artifacts.len());

    let found = find_artifact(&artifacts, &runs, filter).cloned();
    if let Some(artifact) = &found {
        info!(
            "==> Artifact found: {}.zip ({})",
            artifact.name,
            format_size(artifact.size_in_bytes)
        );
    }

    Ok(found)
}

/// Swap the artifact's public locator for the runtime service URL the
/// deployment backend downloads from.
pub async fn resolve_download_url<A: PagesApi + ?Sized>(
    api: &A,
    artifact: &Artifact,
) -> Result<String, ResolveError> {
    let run_id = artifact.run_id().ok_or(ResolveError::NoArtifactUrl)?;

    info!("===> Requesting artifacts of run {run_id} to swap download URL");

    let url = api
        .list_run_artifacts(run_id)
        .await?
        .into_iter()
        .find(|entry| entry.name == artifact.name)
        .map(|entry| entry.url)
        .ok_or(ResolveError::NoArtifactUrl)?;

    Ok(format!("{url}{SIGNED_CONTENT_QUERY}"))
}
