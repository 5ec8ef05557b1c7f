//! Job run types

use crate::error::{Error, ErrorKind};
use crate::storage::output_name;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle state of one conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Idle,
    Fetching,
    Parsing,
    InferringSchema,
    Encoding,
    Relocating,
    Succeeded,
    Failed,
}

impl JobState {
    /// The state a successful step leads to, `None` for terminal states
    pub fn next(self) -> Option<JobState> {
        match self {
            JobState::Idle => Some(JobState::Fetching),
            JobState::Fetching => Some(JobState::Parsing),
            JobState::Parsing => Some(JobState::InferringSchema),
            JobState::InferringSchema => Some(JobState::Encoding),
            JobState::Encoding => Some(JobState::Relocating),
            JobState::Relocating => Some(JobState::Succeeded),
            JobState::Succeeded | JobState::Failed => None,
        }
    }

    /// Whether the run has finished
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Fetching => "fetching",
            JobState::Parsing => "parsing",
            JobState::InferringSchema => "inferring_schema",
            JobState::Encoding => "encoding",
            JobState::Relocating => "relocating",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Transient record of one scheduled execution
#[derive(Debug)]
pub struct JobRun {
    /// Input object name
    pub input: String,
    /// Derived output object name
    pub output: String,
    state: JobState,
    /// State the run was in when it failed
    failed_in: Option<JobState>,
    last_error: Option<Arc<Error>>,
}

impl JobRun {
    /// Start a run for `input` in the `Idle` state
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();
        let output = output_name(&input);
        Self {
            input,
            output,
            state: JobState::Idle,
            failed_in: None,
            last_error: None,
        }
    }

    /// Current state
    pub fn state(&self) -> JobState {
        self.state
    }

    /// State at the time of failure, if failed
    pub fn failed_in(&self) -> Option<JobState> {
        self.failed_in
    }

    /// The error that failed the run
    pub fn last_error(&self) -> Option<&Arc<Error>> {
        self.last_error.as_ref()
    }

    /// Move to the next state of the happy path
    pub fn advance(&mut self) -> JobState {
        if let Some(next) = self.state.next() {
            tracing::debug!(object = %self.input, from = %self.state, to = %next, "job state changed");
            self.state = next;
        }
        self.state
    }

    /// Move to `Failed`, recording the error
    pub fn fail(&mut self, error: Error) {
        if self.state.is_terminal() {
            return;
        }
        tracing::debug!(object = %self.input, from = %self.state, to = %JobState::Failed, "job state changed");
        self.failed_in = Some(self.state);
        self.state = JobState::Failed;
        self.last_error = Some(Arc::new(error));
    }
}

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed,
}

/// Counters from a successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionStats {
    /// Data rows encoded
    pub rows: usize,
    /// Size of the stored Parquet object
    pub bytes: usize,
    /// Columns in the inferred schema
    pub columns: usize,
}

/// Completion signal emitted once per run
#[derive(Debug, Clone)]
pub struct JobCompletion {
    /// Input object name
    pub object_name: String,
    /// Output object name (written only on success)
    pub output_name: String,
    pub outcome: JobOutcome,
    /// State the run failed in
    pub failed_in: Option<JobState>,
    pub error: Option<Arc<Error>>,
    pub stats: ConversionStats,
    pub elapsed: Duration,
}

impl JobCompletion {
    /// Build the completion for a finished run
    pub(crate) fn from_run(run: JobRun, stats: ConversionStats, elapsed: Duration) -> Self {
        let outcome = if run.state == JobState::Succeeded {
            JobOutcome::Succeeded
        } else {
            JobOutcome::Failed
        };
        Self {
            object_name: run.input,
            output_name: run.output,
            outcome,
            failed_in: run.failed_in,
            error: run.last_error,
            stats,
            elapsed,
        }
    }

    /// Whether the run succeeded
    pub fn succeeded(&self) -> bool {
        self.outcome == JobOutcome::Succeeded
    }

    /// Classification of the failure, if any
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_deref().map(Error::kind)
    }
}
