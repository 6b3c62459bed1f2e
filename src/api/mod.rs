// ABOUTME: Remote API layer: the provider contract, its HTTP client, and errors.
// ABOUTME: Calls are awaited one at a time and never retried here.

mod client;
mod error;
mod traits;

pub use client::{GithubClient, IdTokenClient, http_client};
pub use error::{ApiError, ApiErrorKind, ResponseBody};
pub use traits::{IdTokenError, IdTokenProvider, PagesApi};
