// ABOUTME: Named inputs and the validated run configuration built from them.
// ABOUTME: Validation happens once at start-up, before any network call.

mod credentials;
mod endpoints;
mod error_treatment;

pub use credentials::{IdTokenSource, Secret};
pub use endpoints::{DEFAULT_API_URL, Endpoints, PAGE_SIZE};
pub use error_treatment::ErrorTreatment;

use crate::types::Repository;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Raw named parameters, as handed over by the pipeline.
///
/// Every value may come from a flag or from the environment variable the
/// pipeline uses to pass step inputs and run context.
#[derive(Clone, Default, Args)]
pub struct Inputs {
    /// Name of the artifact to deploy
    #[arg(long, env = "INPUT_ARTIFACT_NAME")]
    pub artifact_name: Option<String>,

    /// Only consider artifacts built from this branch
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Only consider artifacts built by this workflow (name or file)
    #[arg(long, env = "INPUT_WORKFLOWNAME")]
    pub workflow_name: Option<String>,

    /// Repository in owner/repo form
    #[arg(long, env = "INPUT_REPO")]
    pub repo: Option<String>,

    #[arg(long, env = "GITHUB_REPOSITORY", hide = true)]
    pub github_repository: Option<String>,

    /// Give up after this many milliseconds
    #[arg(long, env = "INPUT_TIMEOUT")]
    pub timeout: Option<String>,

    /// Milliseconds between status checks
    #[arg(long, env = "INPUT_REPORTING_INTERVAL")]
    pub reporting_interval: Option<String>,

    /// Abort after this many non-success status checks
    #[arg(long, env = "INPUT_ERROR_COUNT")]
    pub error_count: Option<String>,

    /// API token with pages and actions access
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// What to do on failure: fail, warn or ignore
    #[arg(long, env = "INPUT_ON_ERROR")]
    pub on_error: Option<String>,

    /// Identity token to present instead of requesting one
    #[arg(long, env = "INPUT_ID_TOKEN", hide_env_values = true)]
    pub id_token: Option<String>,

    #[arg(long, env = "ACTIONS_ID_TOKEN_REQUEST_URL", hide = true)]
    pub id_token_request_url: Option<String>,

    #[arg(
        long,
        env = "ACTIONS_ID_TOKEN_REQUEST_TOKEN",
        hide = true,
        hide_env_values = true
    )]
    pub id_token_request_token: Option<String>,

    /// Commit being deployed
    #[arg(long, env = "GITHUB_SHA")]
    pub build_version: Option<String>,

    #[arg(long, env = "GITHUB_ACTOR", hide = true)]
    pub actor: Option<String>,

    #[arg(long, env = "GITHUB_ACTION", hide = true)]
    pub action: Option<String>,

    /// Base URL of the REST API
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "ACTIONS_RUNTIME_URL", hide = true)]
    pub runtime_url: Option<String>,

    /// File that receives step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,
}

impl Inputs {
    /// Treatment to apply even when the rest of the inputs are unusable.
    ///
    /// Falls back to `fail` when the value is absent or unrecognised.
    pub fn error_treatment(&self) -> ErrorTreatment {
        non_empty(&self.on_error)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: Repository,
    pub artifact_name: String,
    pub branch: Option<String>,
    pub workflow_name: Option<String>,
    pub timeout: Duration,
    pub reporting_interval: Duration,
    pub error_count: u32,
    pub on_error: ErrorTreatment,
    pub token: Secret,
    pub id_token: IdTokenSource,
    pub build_version: String,
    pub actor: String,
    pub action: String,
    pub endpoints: Endpoints,
    pub output_file: Option<PathBuf>,
}

impl Config {
    pub fn from_inputs(inputs: Inputs) -> Result<Self> {
        let mut required = Required::default();
        let artifact_name = required.take("artifact_name", &inputs.artifact_name);
        let runtime_url = required.take("runtime_url", &inputs.runtime_url);
        let repository = required.take_any(
            "repository_name",
            &[&inputs.repo, &inputs.github_repository],
        );
        let build_version = required.take("github_sha", &inputs.build_version);
        let actor = required.take("github_actor", &inputs.actor);
        let action = required.take("github_action", &inputs.action);
        let token = required.take("github_token", &inputs.token);
        let timeout = required.take("timeout", &inputs.timeout);
        let reporting_interval = required.take("reporting_interval", &inputs.reporting_interval);
        let error_count = required.take("error_count", &inputs.error_count);
        required.finish()?;

        let repository = Repository::parse(&repository).map_err(|e| ConfigError::Invalid {
            name: "repository_name",
            reason: e.to_string(),
        })?;

        let on_error = match non_empty(&inputs.on_error) {
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                name: "on_error",
                reason,
            })?,
            None => ErrorTreatment::default(),
        };

        let api_url = non_empty(&inputs.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let endpoints = Endpoints::new(&api_url, &runtime_url, repository.clone(), &build_version);

        Ok(Config {
            repository,
            artifact_name,
            branch: non_empty(&inputs.branch).map(|b| strip_branch_prefix(&b).to_string()),
            workflow_name: non_empty(&inputs.workflow_name),
            timeout: parse_millis("timeout", &timeout)?,
            reporting_interval: parse_millis("reporting_interval", &reporting_interval)?,
            error_count: parse_number("error_count", &error_count)?,
            on_error,
            token: Secret::new(token),
            id_token: IdTokenSource::from_parts(
                non_empty(&inputs.id_token),
                non_empty(&inputs.id_token_request_url),
                non_empty(&inputs.id_token_request_token),
            ),
            build_version,
            actor,
            action,
            endpoints,
            output_file: inputs.output_file,
        })
    }
}

/// Drop a leading `refs/heads/` so a full ref matches the run's branch name.
pub fn strip_branch_prefix(branch: &str) -> &str {
    branch.strip_prefix("refs/heads/").unwrap_or(branch)
}

/// Collects the names of required inputs that were not supplied.
#[derive(Default)]
struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    fn take(&mut self, name: &'static str, value: &Option<String>) -> String {
        self.take_any(name, &[value])
    }

    fn take_any(&mut self, name: &'static str, candidates: &[&Option<String>]) -> String {
        match candidates.iter().find_map(|value| non_empty(value)) {
            Some(value) => value,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(self.missing))
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: format!("'{value}' is not a valid number: {e}"),
    })
}

fn parse_millis(name: &'static str, value: &str) -> Result<Duration> {
    parse_number::<u64>(name, value).map(Duration::from_millis)
}
