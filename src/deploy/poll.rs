// ABOUTME: Status poller that drives a submitted deployment to a terminal state.
// ABOUTME: Sleeps, checks, counts errors, then applies the rule table each tick.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::cancel::Canceller;
use super::state::{FailureReason, Limits, PollState, StatusSnapshot, evaluate};
use crate::api::PagesApi;
use crate::config::Config;
use crate::types::DeploymentStatus;

/// Extra attempts after a failed status check.
pub const STATUS_RETRIES: u32 = 3;
/// Pause between status check attempts.
pub const STATUS_RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub limits: Limits,
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl PollSettings {
    pub fn new(interval: Duration, timeout: Duration, error_threshold: u32) -> Self {
        Self {
            interval,
            limits: Limits {
                error_threshold,
                timeout,
            },
            retries: STATUS_RETRIES,
            retry_backoff: STATUS_RETRY_BACKOFF,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.reporting_interval, config.timeout, config.error_count)
    }
}

/// The deployment reached a failed terminal state.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct PollError {
    pub reason: FailureReason,
    pub last_status: Option<DeploymentStatus>,
    pub ticks: u32,
}

/// Summary of a successful polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub ticks: u32,
    pub error_count: u32,
    pub elapsed: Duration,
}

pub struct StatusPoller<'a, A: ?Sized> {
    api: &'a A,
    status_url: String,
    settings: PollSettings,
    canceller: &'a Canceller<'a, A>,
    interrupt: CancellationToken,
}

impl<'a, A: PagesApi + ?Sized> StatusPoller<'a, A> {
    pub fn new(
        api: &'a A,
        status_url: impl Into<String>,
        settings: PollSettings,
        canceller: &'a Canceller<'a, A>,
        interrupt: CancellationToken,
    ) -> Self {
        Self {
            api,
            status_url: status_url.into(),
            settings,
            canceller,
            interrupt,
        }
    }

    /// Poll until the deployment succeeds or fails.
    ///
    /// Every tick sleeps first, so the first check happens one interval after
    /// the call. The interrupt token is observed during both the sleep and
    /// the status check. Any failed terminal state cancels the deployment
    /// before returning.
    pub async fn wait(&self) -> Result<PollReport, PollError> {
        let start = Instant::now();
        let mut error_count = 0;
        let mut ticks = 0;

        loop {
            tokio::select! {
                biased;
                () = self.interrupt.cancelled() => {
                    return Err(self.fail(FailureReason::Interrupted, None, ticks).await);
                }
                () = sleep(self.settings.interval) => {}
            }
            ticks += 1;

            let status = tokio::select! {
                biased;
                () = self.interrupt.cancelled() => {
                    return Err(self.fail(FailureReason::Interrupted, None, ticks).await);
                }
                status = self.check_status() => status,
            };
            if status.counts_as_error() {
                error_count += 1;
            }

            let snapshot = StatusSnapshot {
                status,
                error_count,
                elapsed: start.elapsed(),
            };

            match evaluate(&snapshot, &self.settings.limits) {
                PollState::Polling => match snapshot.status.transient_message() {
                    Some(message) => info!("{message}"),
                    None => info!("Current status: {}", snapshot.status),
                },
                PollState::Succeeded => {
                    return Ok(PollReport {
                        ticks,
                        error_count,
                        elapsed: snapshot.elapsed,
                    });
                }
                PollState::Failed(reason) => {
                    return Err(self.fail(reason, Some(snapshot.status), ticks).await);
                }
            }
        }
    }

    /// Query the status, retrying transport failures with a fixed backoff.
    ///
    /// Exhausted retries become the `deployment_check_failed` status rather
    /// than an error, so the rule table handles them like any other status.
    async fn check_status(&self) -> DeploymentStatus {
        let mut attempt = 0;
        loop {
            match self.api.deployment_status(&self.status_url).await {
                Ok(status) => return status,
                Err(err) if attempt < self.settings.retries => {
                    attempt += 1;
                    warn!(attempt, error = %err, "status check failed, retrying");
                    sleep(self.settings.retry_backoff).await;
                }
                Err(err) => {
                    warn!(error = %err, "status check failed after {} retries", attempt);
                    return DeploymentStatus::check_failed();
                }
            }
        }
    }

    async fn fail(
        &self,
        reason: FailureReason,
        last_status: Option<DeploymentStatus>,
        ticks: u32,
    ) -> PollError {
        self.canceller.cancel().await;
        PollError {
            reason,
            last_status,
            ticks,
        }
    }
}
