//! Command-line flags.

use crate::selector::Label;
use clap::{ArgAction, CommandFactory, Parser};
use std::str::FromStr;

/// Default deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Longest accepted deadline, one year
pub const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

/// Wait for Tekton PipelineRuns to finish.
///
/// Exits 0 when every run succeeded, 21 when at least one failed and 124 when
/// the timeout expires first.
#[derive(Debug, Parser)]
#[command(name = "pipelinerun-wait", disable_help_flag = true)]
pub struct Cli {
    /// PipelineRun name (mutually exclusive with -l)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Label selector, repeatable; all labels must match
    #[arg(short = 'l', long = "label", value_name = "KEY=VALUE", value_parser = Label::from_str)]
    pub labels: Vec<Label>,

    /// Seconds to wait before giving up
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(..=MAX_TIMEOUT_SECS)
    )]
    pub timeout: u64,

    /// Namespace to read from (defaults to the kubeconfig namespace)
    #[arg(short = 'N', long = "namespace", env = "PIPELINERUN_NAMESPACE")]
    pub namespace: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Print usage and exit
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,
}

/// Rendered usage text.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
