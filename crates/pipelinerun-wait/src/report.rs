//! Stdout reporting.
//!
//! Per-iteration status lines and the summary block printed on every terminal
//! outcome. Diagnostics go through `tracing` instead.

use crate::classify::ClassifiedRun;
use crate::error::WaitError;
use crate::poller::Outcome;
use crds::PipelineRun;
use std::io::Write;
use std::time::Duration;

/// One status line for a classified run.
pub fn status_line(run: &ClassifiedRun) -> String {
    format!("PipelineRun {}: {}", run.name, run.state)
}

/// Verdict line for a terminal outcome.
pub fn verdict_line(outcome: Outcome, timeout: Duration) -> String {
    match outcome {
        Outcome::Succeeded => "All PipelineRuns succeeded".to_string(),
        Outcome::Failed => "At least one PipelineRun failed".to_string(),
        Outcome::TimedOut => format!(
            "Timed out after {}s waiting for PipelineRuns",
            timeout.as_secs()
        ),
    }
}

/// Write the verdict and the `Conditions:` block for the last snapshot.
pub fn write_summary<W: Write>(
    out: &mut W,
    outcome: Outcome,
    timeout: Duration,
    runs: &[PipelineRun],
) -> Result<(), WaitError> {
    writeln!(out, "{}", verdict_line(outcome, timeout))?;
    writeln!(out, "Conditions:")?;
    for run in runs {
        let name = run.metadata.name.as_deref().unwrap_or("<unknown>");
        let conditions = serde_json::to_string(run.conditions())?;
        writeln!(out, "{name}: {conditions}")?;
    }
    out.flush()?;
    Ok(())
}
