// ABOUTME: Process signal handling that feeds the shared cancellation token.
// ABOUTME: SIGINT and SIGTERM both cancel the run; the signal picks the exit code.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// A termination request delivered to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl Signal {
    /// Conventional shell exit code for a process stopped by this signal.
    pub fn exit_code(&self) -> u8 {
        match self {
            Signal::Interrupt => 130,
            Signal::Terminate => 143,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Resolves when the process receives Ctrl+C / SIGINT or SIGTERM.
pub async fn shutdown_signal() -> Signal {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => Signal::Interrupt,
        () = terminate => Signal::Terminate,
    }
}

/// Watches for termination signals in the background.
pub struct SignalWatcher {
    token: CancellationToken,
    received: Arc<OnceLock<Signal>>,
}

impl SignalWatcher {
    /// Spawn the watcher task. Must be called inside a Tokio runtime.
    pub fn spawn() -> Self {
        let token = CancellationToken::new();
        let received = Arc::new(OnceLock::new());

        let task_token = token.clone();
        let task_received = Arc::clone(&received);
        tokio::spawn(async move {
            let signal = shutdown_signal().await;
            info!("Received {signal}, cancelling deployment");
            let _ = task_received.set(signal);
            task_token.cancel();
        });

        Self { token, received }
    }

    /// Token cancelled once a signal arrives.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// The signal that was received, if any.
    pub fn received(&self) -> Option<Signal> {
        self.received.get().copied()
    }
}
