// ABOUTME: Deployment lifecycle: submission, status polling, and cancellation.
// ABOUTME: One submission and one poll loop exist per run.

mod cancel;
mod poll;
mod state;
mod submit;

pub use cancel::{CancelOutcome, CancellationError, Canceller};
pub use poll::{
    PollError, PollReport, PollSettings, STATUS_RETRIES, STATUS_RETRY_BACKOFF, StatusPoller,
};
pub use state::{FailureReason, Limits, PollState, StatusSnapshot, evaluate};
pub use submit::{SubmissionError, SubmissionErrorKind, Submitter};
