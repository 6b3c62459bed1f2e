// ABOUTME: Policy for reporting a failed run to the host pipeline.
// ABOUTME: Fail aborts the step; warn and ignore only differ in log severity.

use std::fmt;
use std::str::FromStr;

/// How a terminal failure is surfaced to the calling pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorTreatment {
    /// Mark the step failed.
    #[default]
    Fail,
    /// Emit a warning and expose the message as an output.
    Warn,
    /// Emit an informational message and expose it as an output.
    Ignore,
}

impl ErrorTreatment {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTreatment::Fail => "fail",
            ErrorTreatment::Warn => "warn",
            ErrorTreatment::Ignore => "ignore",
        }
    }

    /// Whether the failure message is also published as `error_message`.
    pub fn sets_error_output(&self) -> bool {
        !matches!(self, ErrorTreatment::Fail)
    }
}

impl FromStr for ErrorTreatment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(ErrorTreatment::Fail),
            "warn" => Ok(ErrorTreatment::Warn),
            "ignore" => Ok(ErrorTreatment::Ignore),
            other => Err(format!(
                "unknown error treatment '{other}' (expected fail, warn or ignore)"
            )),
        }
    }
}

impl fmt::Display for ErrorTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
