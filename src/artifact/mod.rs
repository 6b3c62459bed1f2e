// ABOUTME: Artifact resolution: which uploaded bundle gets deployed.
// ABOUTME: Exports the pure filter and the API-driven lookup built on it.

mod filter;
mod resolver;
mod size;

pub use filter::{ArtifactFilter, find_artifact};
pub use resolver::{ResolveError, find_target_artifact, resolve_download_url, resolve_workflow_id};
pub use size::format_size;
