// ABOUTME: Application-wide error types for the deployer.
// ABOUTME: Each variant is one stage of the run; the top-level handler serializes them.

use serde::Serialize;
use thiserror::Error;

use crate::api::{ApiErrorKind, IdTokenError};
use crate::artifact::ResolveError;
use crate::config::ConfigError;
use crate::deploy::{PollError, SubmissionError, SubmissionErrorKind};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Ensure GITHUB_TOKEN has permission \"id-token: write\".")]
    IdToken(#[source] IdTokenError),

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Status(#[from] PollError),

    #[error("deployment interrupted by signal")]
    Interrupted,
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    IdToken,
    Resolution,
    Submission,
    Transport,
    Status,
    Interrupted,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Client(_) => ErrorKind::Transport,
            Error::IdToken(_) => ErrorKind::IdToken,
            Error::Resolution(ResolveError::Api(err)) if err.kind() == ApiErrorKind::Transport => {
                ErrorKind::Transport
            }
            Error::Resolution(_) => ErrorKind::Resolution,
            Error::Submission(err) if err.kind() == SubmissionErrorKind::Transport => {
                ErrorKind::Transport
            }
            Error::Submission(_) => ErrorKind::Submission,
            Error::Status(_) => ErrorKind::Status,
            Error::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Machine-readable form logged by the top-level handler.
    pub fn to_json(&self) -> String {
        let report = ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        };
        serde_json::to_string(&report).unwrap_or_else(|_| report.message)
    }
}

#[derive(Serialize)]
struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

pub type Result<T> = std::result::Result<T, Error>;
