// ABOUTME: Best-effort cancellation of the in-flight deployment.
// ABOUTME: Runs at most once per process; failures are recorded, never raised.

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::api::{ApiError, PagesApi};

/// The provider refused or never answered the cancellation request.
#[derive(Debug, thiserror::Error)]
#[error("failed to cancel deployment via {url}: {detail}")]
pub struct CancellationError {
    pub url: String,
    pub detail: String,
}

impl CancellationError {
    fn from_api(url: &str, err: &ApiError) -> Self {
        let detail = match err.response() {
            Some((status, body)) => format!("HTTP {status}: {body}"),
            None => err.to_string(),
        };
        Self {
            url: url.to_string(),
            detail,
        }
    }
}

/// Result of the single cancellation attempt.
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled,
    Failed(CancellationError),
}

impl CancelOutcome {
    pub fn failure(&self) -> Option<&CancellationError> {
        match self {
            CancelOutcome::Cancelled => None,
            CancelOutcome::Failed(err) => Some(err),
        }
    }
}

/// Shared by the poller's fatal path and the interrupt path.
pub struct Canceller<'a, A: ?Sized> {
    api: &'a A,
    url: String,
    outcome: OnceCell<CancelOutcome>,
}

impl<'a, A: PagesApi + ?Sized> Canceller<'a, A> {
    pub fn new(api: &'a A, url: impl Into<String>) -> Self {
        Self {
            api,
            url: url.into(),
            outcome: OnceCell::new(),
        }
    }

    /// Ask the provider to abort the deployment.
    ///
    /// Later calls return the first outcome without another request.
    pub async fn cancel(&self) -> &CancelOutcome {
        self.outcome
            .get_or_init(|| async {
                match self.api.cancel_deployment(&self.url).await {
                    Ok(()) => {
                        info!("Deployment cancelled with {}", self.url);
                        CancelOutcome::Cancelled
                    }
                    Err(err) => {
                        let err = CancellationError::from_api(&self.url, &err);
                        error!("{err}");
                        CancelOutcome::Failed(err)
                    }
                }
            })
            .await
    }

    /// Outcome of the attempt, if one was made.
    pub fn outcome(&self) -> Option<&CancelOutcome> {
        self.outcome.get()
    }
}
