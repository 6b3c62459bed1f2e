// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Every input also reads the environment variable the pipeline sets.

use clap::Parser;
use pages_deployer::config::Inputs;
use pages_deployer::output::OutputMode;

#[derive(Parser)]
#[command(name = "pages-deployer")]
#[command(about = "Deploy a workflow artifact to GitHub Pages and wait for it to go live")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub inputs: Inputs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Message format (defaults to workflow commands inside a pipeline)
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,

    #[arg(long, env = "GITHUB_ACTIONS", hide = true)]
    pub github_actions: Option<String>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        match (self.output, self.github_actions.as_deref()) {
            (Some(mode), _) => mode,
            (None, Some("true")) => OutputMode::Actions,
            (None, _) => OutputMode::Plain,
        }
    }
}
