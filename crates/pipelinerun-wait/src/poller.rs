//! Poll loop.
//!
//! Each iteration re-fetches the whole target set, classifies every run and
//! aggregates the result. Nothing carries over between iterations except the
//! latched failure flag.

use crate::classify::{classify_run, ClassifiedRun};
use crate::clock::{add_duration, Clock};
use crate::error::WaitError;
use crate::report;
use crate::selector::Selector;
use chrono::{DateTime, Utc};
use crds::PipelineRun;
use pipelinerun_client::{ClientError, PipelineRunClientTrait};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed delay between iterations
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub const EXIT_SUCCEEDED: u8 = 0;
pub const EXIT_FAILED: u8 = 21;
pub const EXIT_TIMED_OUT: u8 = 124;

/// Terminal outcome of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    TimedOut,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Succeeded => EXIT_SUCCEEDED,
            Outcome::Failed => EXIT_FAILED,
            Outcome::TimedOut => EXIT_TIMED_OUT,
        }
    }
}

/// Poller state after an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Finished(Outcome),
}

/// Aggregate over one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verdict {
    /// Runs in `Succeeded` or `Failed`
    pub done_count: usize,
    pub total: usize,
    /// At least one run is `Failed`
    pub failed: bool,
}

impl Verdict {
    pub fn from_runs(runs: &[ClassifiedRun]) -> Self {
        Self {
            done_count: runs.iter().filter(|run| run.state.is_done()).count(),
            total: runs.len(),
            failed: runs.iter().any(|run| run.state.is_failed()),
        }
    }

    /// Every run is terminal. An empty snapshot is vacuously done.
    pub fn is_done(&self) -> bool {
        self.done_count == self.total
    }
}

/// Result of a completed wait
#[derive(Debug)]
pub struct PollReport {
    pub outcome: Outcome,
    pub iterations: u32,
    /// Last snapshot that was fetched successfully
    pub runs: Vec<PipelineRun>,
}

/// Poller context: target, deadline and the latched failure flag.
pub struct Poller<C, K, W> {
    client: C,
    clock: K,
    selector: Selector,
    timeout: Duration,
    deadline: DateTime<Utc>,
    interval: Duration,
    failed: bool,
    iterations: u32,
    last_snapshot: Vec<PipelineRun>,
    out: W,
}

impl<C, K, W> Poller<C, K, W>
where
    C: PipelineRunClientTrait,
    K: Clock,
    W: Write,
{
    /// Create a poller whose deadline is `timeout` from the clock's current time.
    pub fn new(
        client: C,
        clock: K,
        selector: Selector,
        timeout: Duration,
        out: W,
    ) -> Result<Self, WaitError> {
        let deadline = add_duration(clock.now(), timeout).ok_or_else(|| {
            WaitError::InvalidTimeout(format!("{}s is out of range", timeout.as_secs()))
        })?;

        Ok(Self {
            client,
            clock,
            selector,
            timeout,
            deadline,
            interval: POLL_INTERVAL,
            failed: false,
            iterations: 0,
            last_snapshot: Vec::new(),
            out,
        })
    }

    /// Fetch the current snapshot for the selector.
    async fn fetch(&self) -> Result<Vec<PipelineRun>, ClientError> {
        match &self.selector {
            Selector::Name(name) => Ok(vec![self.client.get(name).await?]),
            Selector::Labels(_) => self.client.list(&self.selector.label_pairs()).await,
        }
    }

    /// Run a single iteration: fetch, classify, aggregate, check the deadline.
    ///
    /// A missing named run or a rejected request is fatal. Transient fetch
    /// errors leave the iteration undecided so the next one retries.
    pub async fn step(&mut self) -> Result<PollState, WaitError> {
        self.iterations += 1;
        debug!("Poll iteration {} for {}", self.iterations, self.selector);

        let fetched = self.fetch().await;
        match fetched {
            Ok(runs) => {
                let classified: Vec<ClassifiedRun> = runs.iter().map(classify_run).collect();
                for run in &classified {
                    writeln!(self.out, "{}", report::status_line(run))?;
                }
                self.out.flush()?;

                let verdict = Verdict::from_runs(&classified);
                self.failed |= verdict.failed;
                self.last_snapshot = runs;

                debug!(
                    "{}/{} PipelineRuns done, failure latched: {}",
                    verdict.done_count, verdict.total, self.failed
                );

                if verdict.is_done() {
                    let outcome = if self.failed {
                        Outcome::Failed
                    } else {
                        Outcome::Succeeded
                    };
                    return Ok(PollState::Finished(outcome));
                }
            }
            Err(e) if e.is_not_found() => {
                return Err(WaitError::ResourceNotFound(e.to_string()));
            }
            Err(e) if e.is_transient() => {
                warn!("Failed to fetch PipelineRuns for {}: {}", self.selector, e);
            }
            Err(e) => return Err(WaitError::Client(e)),
        }

        if self.clock.now() > self.deadline {
            return Ok(PollState::Finished(Outcome::TimedOut));
        }

        Ok(PollState::Polling)
    }

    /// Poll until a terminal outcome, then print the summary.
    pub async fn run(mut self) -> Result<PollReport, WaitError> {
        info!(
            "Waiting until {} for PipelineRuns in {} ({})",
            self.deadline.to_rfc3339(),
            self.client.namespace(),
            self.selector
        );

        let outcome = loop {
            match self.step().await? {
                PollState::Polling => self.clock.sleep(self.interval).await,
                PollState::Finished(outcome) => break outcome,
            }
        };

        report::write_summary(&mut self.out, outcome, self.timeout, &self.last_snapshot)?;

        Ok(PollReport {
            outcome,
            iterations: self.iterations,
            runs: self.last_snapshot,
        })
    }
}
