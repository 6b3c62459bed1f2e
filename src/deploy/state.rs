// ABOUTME: States of the status-polling machine and the rule table that drives it.
// ABOUTME: Rules are checked in a fixed priority order; the first match wins.

use std::fmt;
use std::time::Duration;

use crate::types::DeploymentStatus;

/// Why a polling run ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The status endpoint could not be reached after retries.
    StatusCheckFailed,
    /// The provider reported a permanent deployment failure.
    DeploymentFailed,
    /// The provider rejected the artifact content.
    InvalidArtifact,
    /// The error budget was used up.
    TooManyErrors,
    /// The configured timeout elapsed.
    Timeout,
    /// The process was asked to stop.
    Interrupted,
}

impl FailureReason {
    pub fn message(&self) -> &'static str {
        match self {
            FailureReason::StatusCheckFailed => "Error while trying to check the deployment status.",
            FailureReason::DeploymentFailed => "Deployment failed, try again later.",
            FailureReason::InvalidArtifact => {
                "Artifact could not be deployed. Please ensure the content does not contain any hard links, symlinks and total size is less than 10GB."
            }
            FailureReason::TooManyErrors => "Too many errors, aborting!",
            FailureReason::Timeout => "Timeout reached, aborting!",
            FailureReason::Interrupted => "Deployment interrupted, cancelling.",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Where the polling machine stands after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Succeeded,
    Failed(FailureReason),
}


/// Everything the rule table looks at on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: DeploymentStatus,
    pub error_count: u32,
    pub elapsed: Duration,
}

/// Limits the rule table compares the snapshot against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub error_threshold: u32,
    pub timeout: Duration,
}

/// Apply the polling rules to one snapshot.
///
/// Order: success, the three named failures, error budget, timeout. A
/// `succeed` status therefore wins even when the budget ran out on the same
/// tick, and the timeout only fires when nothing else did.
pub fn evaluate(snapshot: &StatusSnapshot, limits: &Limits) -> PollState {
    let status = &snapshot.status;

    if status.is(DeploymentStatus::SUCCEED) {
        return PollState::Succeeded;
    }
    if status.is(DeploymentStatus::CHECK_FAILED) {
        return PollState::Failed(FailureReason::StatusCheckFailed);
    }
    if status.is(DeploymentStatus::FAILED) {
        return PollState::Failed(FailureReason::DeploymentFailed);
    }
    if status.is(DeploymentStatus::CONTENT_FAILED) {
        return PollState::Failed(FailureReason::InvalidArtifact);
    }
    if snapshot.error_count >= limits.error_threshold {
        return PollState::Failed(FailureReason::TooManyErrors);
    }
    if snapshot.elapsed >= limits.timeout {
        return PollState::Failed(FailureReason::Timeout);
    }

    PollState::Polling
}
