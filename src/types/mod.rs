// ABOUTME: Domain types shared by the resolver, submitter, and poller.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod deployment;
mod id;
mod repository;
mod workflow;

pub use deployment::{Deployment, DeploymentRequest, DeploymentStatus};
pub use id::{ArtifactId, Id, RunId, WorkflowId};
pub use repository::{Repository, RepositoryError};
pub use workflow::{Artifact, ArtifactRun, RunArtifact, Workflow, WorkflowRun};
