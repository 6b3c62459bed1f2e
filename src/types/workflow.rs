// ABOUTME: Workflow, workflow run, and artifact records returned by the provider.
// ABOUTME: Fetched read-only during artifact resolution and discarded afterwards.

use serde::Deserialize;

use super::id::{ArtifactId, RunId, WorkflowId};

/// A named build definition in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub path: String,
}

impl Workflow {
    /// Whether this workflow answers to `name`, either by display name or by
    /// the tail of its definition path (with or without the `.yml` suffix).
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
            || self.path.ends_with(name)
            || self.path.ends_with(&format!("{name}.yml"))
    }
}

/// One execution of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,
    pub workflow_id: WorkflowId,
}

/// The run an artifact was produced by.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactRun {
    pub id: RunId,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub head_sha: Option<String>,
}

/// A named, sized bundle uploaded by a previous run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: String,
    pub size_in_bytes: u64,
    /// Download locator in the public REST API.
    pub url: String,
    #[serde(default)]
    pub workflow_run: Option<ArtifactRun>,
}

impl Artifact {
    pub fn run_id(&self) -> Option<RunId> {
        self.workflow_run.as_ref().map(|run| run.id)
    }

    pub fn head_branch(&self) -> Option<&str> {
        self.workflow_run
            .as_ref()
            .and_then(|run| run.head_branch.as_deref())
    }
}

/// An artifact entry as listed by the pipeline runtime service for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunArtifact {
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(name: &str, path: &str) -> Workflow {
        Workflow {
            id: WorkflowId::new(1),
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn matches_display_name() {
        assert!(workflow("Build site", ".github/workflows/site.yml").matches("Build site"));
    }

    #[test]
    fn matches_path_tail() {
        let wf = workflow("Build site", ".github/workflows/site.yml");
        assert!(wf.matches("site.yml"));
        assert!(wf.matches("site"));
        assert!(!wf.matches("docs"));
    }

    #[test]
    fn artifact_parses_provider_listing_entry() {
        let json = r#"{
            "id": 11,
            "name": "github-pages",
            "size_in_bytes": 2048,
            "url": "https://api.github.com/repos/o/r/actions/artifacts/11",
            "expired": false,
            "workflow_run": {"id": 99, "head_branch": "main", "head_sha": "abc"}
        }"#;
        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.run_id(), Some(RunId::new(99)));
        assert_eq!(artifact.head_branch(), Some("main"));
    }
}
