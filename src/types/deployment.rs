// ABOUTME: Deployment record and the status values reported while it runs.
// ABOUTME: Status is a tagged union of numeric codes and named provider states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A deployment created by the provider for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub status_url: String,
    pub page_url: String,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// Body sent to create a deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRequest {
    pub artifact_url: String,
    pub pages_build_version: String,
    pub oidc_token: String,
}

impl DeploymentRequest {
    /// The request with the identity token masked, suitable for logs.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "artifact_url": self.artifact_url,
            "pages_build_version": self.pages_build_version,
            "oidc_token": "***",
        })
    }
}

/// Status reported by the provider for an in-flight deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStatus {
    /// A numeric code in the status field.
    Http(u16),
    /// A named state such as `succeed` or `deployment_in_progress`.
    Named(String),
    /// The response carried no status at all.
    Absent,
}

impl DeploymentStatus {
    pub const SUCCEED: &'static str = "succeed";
    pub const CHECK_FAILED: &'static str = "deployment_check_failed";
    pub const FAILED: &'static str = "deployment_failed";
    pub const CONTENT_FAILED: &'static str = "deployment_content_failed";

    pub fn named(name: impl Into<String>) -> Self {
        DeploymentStatus::Named(name.into())
    }

    /// Sentinel produced when the status endpoint cannot be reached.
    pub fn check_failed() -> Self {
        Self::named(Self::CHECK_FAILED)
    }

    pub fn is(&self, name: &str) -> bool {
        matches!(self, DeploymentStatus::Named(n) if n == name)
    }

    /// Friendlier wording for transient states the provider reports by name.
    pub fn transient_message(&self) -> Option<&'static str> {
        match self {
            DeploymentStatus::Named(name) => match name.as_str() {
                "unknown_status" => Some("Unable to get deployment status."),
                "not_found" => Some("Deployment not found."),
                "deployment_attempt_error" => Some(
                    "Deployment temporarily failed, a retry will be automatically scheduled...",
                ),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether this status uses up part of the error budget.
    ///
    /// Anything other than a numeric 200 or a missing status counts, as does
    /// any named status with a known error message.
    pub fn counts_as_error(&self) -> bool {
        let non_success = !matches!(
            self,
            DeploymentStatus::Http(200) | DeploymentStatus::Absent
        );
        non_success || self.transient_message().is_some()
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Http(code) => write!(f, "{code}"),
            DeploymentStatus::Named(name) => write!(f, "{name}"),
            DeploymentStatus::Absent => write!(f, "undefined"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(u16),
    Name(String),
}

#[derive(Deserialize)]
struct StatusBody {
    #[serde(default)]
    status: Option<RawStatus>,
}

impl<'de> Deserialize<'de> for DeploymentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let body = StatusBody::deserialize(deserializer)?;
        Ok(match body.status {
            Some(RawStatus::Code(code)) => DeploymentStatus::Http(code),
            Some(RawStatus::Name(name)) => DeploymentStatus::Named(name),
            None => DeploymentStatus::Absent,
        })
    }
}
