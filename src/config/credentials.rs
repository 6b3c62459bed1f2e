// ABOUTME: Credential values and the configured source of the identity token.
// ABOUTME: Secrets are masked in Debug output so configs can be logged safely.

use std::fmt;

/// A credential that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Where the short-lived identity token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdTokenSource {
    /// Token handed in directly.
    Provided(Secret),
    /// Token minted on demand by the pipeline's OIDC endpoint.
    Oidc {
        request_url: String,
        request_token: Secret,
    },
    /// Neither was configured; acquisition fails when attempted.
    Unavailable,
}

impl IdTokenSource {
    pub fn from_parts(
        provided: Option<String>,
        request_url: Option<String>,
        request_token: Option<String>,
    ) -> Self {
        if let Some(token) = provided {
            return IdTokenSource::Provided(Secret::new(token));
        }

        match (request_url, request_token) {
            (Some(request_url), Some(request_token)) => IdTokenSource::Oidc {
                request_url,
                request_token: Secret::new(request_token),
            },
            _ => IdTokenSource::Unavailable,
        }
    }
}
