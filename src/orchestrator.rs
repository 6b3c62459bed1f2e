// ABOUTME: Sequences a deployment run from identity token to terminal status.
// ABOUTME: Owns the single top-level error handler that applies the error treatment.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{IdTokenProvider, PagesApi};
use crate::artifact::{ArtifactFilter, ResolveError, find_target_artifact, resolve_download_url};
use crate::config::{Config, ErrorTreatment};
use crate::deploy::{CancelOutcome, Canceller, FailureReason, PollSettings, StatusPoller, Submitter};
use crate::error::{Error, Result};
use crate::output::Output;
use crate::types::Deployment;

/// How a run ended, after reporting has been done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { page_url: String },
    Failed,
    Interrupted,
}

pub struct Orchestrator<'a, A: ?Sized, T: ?Sized> {
    config: &'a Config,
    api: &'a A,
    id_tokens: &'a T,
    output: &'a Output,
    interrupt: CancellationToken,
}

impl<'a, A, T> Orchestrator<'a, A, T>
where
    A: PagesApi + ?Sized,
    T: IdTokenProvider + ?Sized,
{
    pub fn new(
        config: &'a Config,
        api: &'a A,
        id_tokens: &'a T,
        output: &'a Output,
        interrupt: CancellationToken,
    ) -> Self {
        Self {
            config,
            api,
            id_tokens,
            output,
            interrupt,
        }
    }

    /// Run the deployment and report the result.
    ///
    /// Every failure is reported here exactly once; callers only map the
    /// outcome to an exit code.
    pub async fn run(&self) -> RunOutcome {
        let canceller = Canceller::new(self.api, self.config.endpoints.deployment_cancel());
        let result = self.deploy(&canceller).await;

        if let Some(failure) = canceller.outcome().and_then(CancelOutcome::failure) {
            self.output.fail(&failure.to_string());
        }

        match result {
            Ok(deployment) => {
                self.output.set_output("status", "succeed");
                self.output.success("Deployment completed successfully!");
                RunOutcome::Succeeded {
                    page_url: deployment.page_url,
                }
            }
            Err(err) => {
                report_failure(self.output, self.config.on_error, &err);
                match err {
                    Error::Interrupted => RunOutcome::Interrupted,
                    _ => RunOutcome::Failed,
                }
            }
        }
    }

    async fn deploy(&self, canceller: &Canceller<'_, A>) -> Result<Deployment> {
        let deployment = tokio::select! {
            biased;
            () = self.interrupt.cancelled() => {
                canceller.cancel().await;
                return Err(Error::Interrupted);
            }
            created = self.submit() => created?,
        };

        let status_url = if deployment.status_url.is_empty() {
            self.config.endpoints.deployment_status()
        } else {
            deployment.status_url.clone()
        };

        let poller = StatusPoller::new(
            self.api,
            status_url,
            PollSettings::from_config(self.config),
            canceller,
            self.interrupt.clone(),
        );

        match poller.wait().await {
            Ok(report) => {
                info!(
                    ticks = report.ticks,
                    errors = report.error_count,
                    "Reported success after {:.1}s",
                    report.elapsed.as_secs_f64()
                );
                Ok(deployment)
            }
            Err(err) if err.reason == FailureReason::Interrupted => Err(Error::Interrupted),
            Err(err) => Err(err.into()),
        }
    }

    /// Everything up to and including the deployment submission.
    async fn submit(&self) -> Result<Deployment> {
        info!("==> Repository: {}", self.config.repository);

        let id_token = self.id_tokens.id_token().await.map_err(|err| {
            warn!(error = %err, "could not obtain an identity token");
            Error::IdToken(err)
        })?;

        let filter = ArtifactFilter::from_config(self.config);
        let Some(artifact) = find_target_artifact(self.api, &filter).await? else {
            self.output.set_output("artifact", "false");
            return Err(ResolveError::ArtifactNotFound(filter.name).into());
        };
        let artifact_url = resolve_download_url(self.api, &artifact).await?;

        info!("Actor: {}", self.config.actor);
        info!("Action ID: {}", self.config.action);

        let submitter = Submitter::new(
            self.api,
            self.config.endpoints.deployment(),
            &self.config.build_version,
        );
        let deployment = submitter.create_deployment(&artifact_url, &id_token).await?;

        self.output.set_output("page_url", &deployment.page_url);
        Ok(deployment)
    }
}

/// Report a failed run according to the configured treatment.
///
/// The `status` output is always `failed`. Only `fail` marks the step
/// failed; `warn` and `ignore` differ in severity and leave `error_message`
/// set for the caller.
pub fn report_failure(output: &Output, treatment: ErrorTreatment, err: &Error) {
    output.set_output("status", "failed");
    error!("{}", err.to_json());

    let message = err.to_string();
    match treatment {
        ErrorTreatment::Fail => output.fail(&message),
        ErrorTreatment::Warn => output.warning(&message),
        ErrorTreatment::Ignore => output.info(&message),
    }

    if treatment.sets_error_output() {
        output.set_output("error_message", &message);
    }
}
