// ABOUTME: Step outputs and user-facing messages for the host pipeline.
// ABOUTME: Supports workflow commands, plain text, and JSON lines output modes.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// How messages are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputMode {
    /// Workflow commands understood by the pipeline runner
    Actions,
    /// Human-friendly text
    Plain,
    /// JSON lines for scripting
    Json,
}

/// Reports messages and step outputs, and remembers whether the step failed.
pub struct Output {
    mode: OutputMode,
    output_file: Option<PathBuf>,
    failed: AtomicBool,
    start_time: Instant,
}

impl Output {
    pub fn new(mode: OutputMode, output_file: Option<PathBuf>) -> Self {
        Self {
            mode,
            output_file,
            failed: AtomicBool::new(false),
            start_time: Instant::now(),
        }
    }

    /// Seconds since the output was created.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Publish a named step output.
    ///
    /// Written to the outputs file when one is configured; failures to write
    /// are logged and otherwise ignored.
    pub fn set_output(&self, name: &str, value: &str) {
        if self.mode == OutputMode::Json {
            self.emit_json(JsonEvent {
                event: "output",
                message: value,
                name: Some(name),
                duration_secs: None,
            });
        }

        let Some(path) = &self.output_file else {
            tracing::debug!(name, value, "no outputs file configured");
            return;
        };

        let entry = format_output_entry(name, value);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(entry.as_bytes()));

        if let Err(e) = written {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to write step output {name}"
            );
        }
    }

    /// Informational message.
    pub fn info(&self, message: &str) {
        match self.mode {
            OutputMode::Actions | OutputMode::Plain => println!("{message}"),
            OutputMode::Json => self.emit_event("info", message),
        }
    }

    /// Message highlighted by the pipeline runner.
    pub fn notice(&self, message: &str) {
        match self.mode {
            OutputMode::Actions => println!("::notice::{}", escape_data(message)),
            OutputMode::Plain => println!("{message}"),
            OutputMode::Json => self.emit_event("notice", message),
        }
    }

    /// Warning that leaves the step green.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Actions => println!("::warning::{}", escape_data(message)),
            OutputMode::Plain => eprintln!("Warning: {message}"),
            OutputMode::Json => self.emit_event("warning", message),
        }
    }

    /// Error message without changing the step result.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Actions => println!("::error::{}", escape_data(message)),
            OutputMode::Plain => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit_event("error", message),
        }
    }

    /// Report an error and mark the step failed.
    pub fn fail(&self, message: &str) {
        self.error(message);
        self.failed.store(true, Ordering::SeqCst);
    }

    /// Final success message with timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Actions | OutputMode::Plain => {
                self.notice(&format!("{message} ({:.1}s)", self.elapsed_secs()));
            }
            OutputMode::Json => self.emit_json(JsonEvent {
                event: "success",
                message,
                name: None,
                duration_secs: Some(self.elapsed_secs()),
            }),
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.has_failed() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn emit_event(&self, event: &str, message: &str) {
        self.emit_json(JsonEvent {
            event,
            message,
            name: None,
            duration_secs: None,
        });
    }

    fn emit_json(&self, event: JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(&event) {
            println!("{json}");
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Render one `name=value` entry for the outputs file.
///
/// Multi-line values use the heredoc form with a delimiter that does not
/// occur in the value.
fn format_output_entry(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }

    let mut delimiter = format!("ghadelimiter_{}", std::process::id());
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Escape message data for a workflow command.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
