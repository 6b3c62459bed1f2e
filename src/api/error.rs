// ABOUTME: Remote API error types with SNAFU pattern.
// ABOUTME: Separates "no response" transport failures from HTTP error responses.

use snafu::Snafu;

/// Failure of a single remote call. Callers own any retry policy.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("request to {url} failed: {source}"))]
    Transport { url: String, source: reqwest::Error },

    #[snafu(display("{url} responded with HTTP {status}"))]
    Status {
        url: String,
        status: u16,
        body: ResponseBody,
    },

    #[snafu(display("unexpected response from {url}: {source}"))]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response was received.
    Transport,
    /// The server answered with a non-success status.
    Status,
    /// The server answered but the body could not be understood.
    Decode,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Transport { .. } => ApiErrorKind::Transport,
            ApiError::Status { .. } => ApiErrorKind::Status,
            ApiError::Decode { .. } => ApiErrorKind::Decode,
        }
    }

    /// The HTTP response behind this error, if the server sent one.
    pub fn response(&self) -> Option<(u16, &ResponseBody)> {
        match self {
            ApiError::Status { status, body, .. } => Some((*status, body)),
            _ => None,
        }
    }
}

/// Body of an error response, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Json(serde_json::Value),
}

impl ResponseBody {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ResponseBody::Empty;
        }

        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => ResponseBody::Text(s),
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(trimmed.to_string()),
        }
    }

    /// The server's explanation, preferring a structured `message` field.
    pub fn message(&self) -> String {
        match self {
            ResponseBody::Empty => String::new(),
            ResponseBody::Text(text) => text.clone(),
            ResponseBody::Json(value) => match value.get("message").and_then(|m| m.as_str()) {
                Some(message) => message.to_string(),
                None => value.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Empty => f.write_str("<empty>"),
            ResponseBody::Text(text) => f.write_str(text),
            ResponseBody::Json(value) => write!(f, "{value}"),
        }
    }
}
