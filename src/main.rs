// ABOUTME: Entry point for the pages-deployer CLI application.
// ABOUTME: Builds configuration and clients, then runs one deployment.

mod cli;

use clap::Parser;
use cli::Cli;
use pages_deployer::api::{GithubClient, IdTokenClient, http_client};
use pages_deployer::config::{Config, Inputs};
use pages_deployer::error::Error;
use pages_deployer::orchestrator::{Orchestrator, RunOutcome, report_failure};
use pages_deployer::output::Output;
use pages_deployer::signals::SignalWatcher;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let output = Output::new(cli.output_mode(), cli.inputs.output_file.clone());
    run(cli.inputs, &output).await
}

async fn run(inputs: Inputs, output: &Output) -> ExitCode {
    let treatment = inputs.error_treatment();

    let config = match Config::from_inputs(inputs) {
        Ok(config) => config,
        Err(e) => {
            report_failure(output, treatment, &Error::from(e));
            return output.exit_code();
        }
    };

    let http = match http_client() {
        Ok(http) => http,
        Err(e) => {
            report_failure(output, config.on_error, &Error::from(e));
            return output.exit_code();
        }
    };

    let api = GithubClient::new(http.clone(), config.endpoints.clone(), config.token.clone());
    let id_tokens = IdTokenClient::new(http, config.id_token.clone());
    let signals = SignalWatcher::spawn();

    let orchestrator = Orchestrator::new(&config, &api, &id_tokens, output, signals.token());
    match orchestrator.run().await {
        RunOutcome::Interrupted => match signals.received() {
            Some(signal) => ExitCode::from(signal.exit_code()),
            None => ExitCode::FAILURE,
        },
        RunOutcome::Succeeded { .. } | RunOutcome::Failed => output.exit_code(),
    }
}
