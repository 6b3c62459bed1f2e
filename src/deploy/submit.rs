// ABOUTME: Submits the deployment request for a resolved artifact.
// ABOUTME: Classifies rejected submissions by HTTP status into actionable messages.

use tracing::info;

use crate::api::{ApiError, PagesApi};
use crate::config::Secret;
use crate::types::{Deployment, DeploymentRequest};

/// Why the provider refused to create a deployment.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(
        "Failed to create deployment (status: 400) with build version {build_version}. Responded with: {message}"
    )]
    Rejected {
        build_version: String,
        message: String,
    },

    #[error(
        "Failed to create deployment (status: 403) with build version {build_version}. Ensure GITHUB_TOKEN has permission \"pages: write\"."
    )]
    Forbidden { build_version: String },

    #[error(
        "Failed to create deployment (status: 404) with build version {build_version}. Ensure GitHub Pages has been enabled."
    )]
    PagesNotEnabled { build_version: String },

    #[error(
        "Failed to create deployment (status: {status}) with build version {build_version}. Server err, is githubstatus.com reporting a Pages outage? Please re-run the deployment at a later time."
    )]
    ServerError { status: u16, build_version: String },

    #[error("Failed to create deployment (status: {status}) with build version {build_version}.")]
    Unknown { status: u16, build_version: String },

    /// No response at all; the underlying error is passed through untouched.
    #[error(transparent)]
    Transport(ApiError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    Rejected,
    Forbidden,
    PagesNotEnabled,
    ServerError,
    Unknown,
    Transport,
}

impl SubmissionError {
    /// Map a failed submission onto the user-facing taxonomy.
    pub fn classify(error: ApiError, build_version: &str) -> Self {
        let build_version = build_version.to_string();
        let Some((status, body)) = error.response() else {
            return SubmissionError::Transport(error);
        };

        match status {
            400 => SubmissionError::Rejected {
                build_version,
                message: body.message(),
            },
            403 => SubmissionError::Forbidden { build_version },
            404 => SubmissionError::PagesNotEnabled { build_version },
            500.. => SubmissionError::ServerError {
                status,
                build_version,
            },
            _ => SubmissionError::Unknown {
                status,
                build_version,
            },
        }
    }

    pub fn kind(&self) -> SubmissionErrorKind {
        match self {
            SubmissionError::Rejected { .. } => SubmissionErrorKind::Rejected,
            SubmissionError::Forbidden { .. } => SubmissionErrorKind::Forbidden,
            SubmissionError::PagesNotEnabled { .. } => SubmissionErrorKind::PagesNotEnabled,
            SubmissionError::ServerError { .. } => SubmissionErrorKind::ServerError,
            SubmissionError::Unknown { .. } => SubmissionErrorKind::Unknown,
            SubmissionError::Transport(_) => SubmissionErrorKind::Transport,
        }
    }
}

/// Creates the single deployment of a run.
pub struct Submitter<'a, A: ?Sized> {
    api: &'a A,
    url: String,
    build_version: String,
}

impl<'a, A: PagesApi + ?Sized> Submitter<'a, A> {
    pub fn new(api: &'a A, url: impl Into<String>, build_version: impl Into<String>) -> Self {
        Self {
            api,
            url: url.into(),
            build_version: build_version.into(),
        }
    }

    /// Submit `artifact_url` for deployment, authenticated by `id_token`.
    pub async fn create_deployment(
        &self,
        artifact_url: &str,
        id_token: &Secret,
    ) -> Result<Deployment, SubmissionError> {
        let request = DeploymentRequest {
            artifact_url: artifact_url.to_string(),
            pages_build_version: self.build_version.clone(),
            oidc_token: id_token.expose().to_string(),
        };

        info!(
            "Creating deployment with payload:\n{}",
            serde_json::to_string_pretty(&request.redacted()).unwrap_or_default()
        );

        let deployment = self
            .api
            .create_deployment(&self.url, &request)
            .await
            .map_err(|e| SubmissionError::classify(e, &self.build_version))?;

        info!("Created deployment for {}", self.build_version);
        Ok(deployment)
    }
}
