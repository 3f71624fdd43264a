//! PipelineRun Wait
//!
//! Polls Tekton PipelineRuns, selected by name or by labels, until all of them
//! finish or a deadline passes, and exits with a code describing the result:
//! `0` all succeeded, `21` at least one failed, `124` timed out.

mod classify;
mod cli;
mod clock;
mod error;
mod poller;
mod report;
mod selector;

#[cfg(test)]
mod poller_test;

use crate::cli::{usage, Cli};
use crate::clock::SystemClock;
use crate::error::{WaitError, EXIT_USAGE};
use crate::poller::{Outcome, Poller};
use crate::selector::Selector;
use clap::Parser;
use pipelinerun_client::PipelineRunClient;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if cli.help {
        eprintln!("{}", usage());
        return ExitCode::from(EXIT_USAGE);
    }

    init_tracing(cli.verbose);

    let selector = match Selector::from_args(cli.name, cli.labels) {
        Ok(selector) => selector,
        Err(e) => {
            eprintln!("error: {e}\n");
            eprintln!("{}", usage());
            return ExitCode::from(e.exit_code());
        }
    };

    match run(selector, cli.namespace.as_deref(), cli.timeout).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Log to stderr so stdout only carries the status report.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(
    selector: Selector,
    namespace: Option<&str>,
    timeout_secs: u64,
) -> Result<Outcome, WaitError> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let client = PipelineRunClient::try_default(namespace).await?;
    info!("Configuration:");
    info!("  Selector: {}", selector);
    info!("  Timeout: {}s", timeout_secs);

    let poller = Poller::new(
        client,
        SystemClock,
        selector,
        Duration::from_secs(timeout_secs),
        std::io::stdout(),
    )?;
    let report = poller.run().await?;
    info!(
        "Finished after {} poll(s) with {:?}, {} PipelineRun(s) in final snapshot",
        report.iterations,
        report.outcome,
        report.runs.len()
    );

    Ok(report.outcome)
}
