//! Fixed-cadence trigger for the job runner
//!
//! Every tick spawns one run of the configured object on its own task, so a
//! slow run never delays the next tick. Overlapping triggers for the same
//! object are dropped by the runner. Shutdown stops the ticking and waits for
//! runs already in flight.

use crate::job::JobRunner;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default tick interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest accepted tick interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Counters reported when the scheduler stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    /// Triggers fired
    pub ticks: u64,
    /// Runs that reached a terminal state
    pub completed: u64,
    /// Triggers dropped because a run was still in flight
    pub skipped: u64,
}

/// Fires the job runner for one object on a fixed interval
#[derive(Debug)]
pub struct Scheduler {
    runner: JobRunner,
    object: String,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler for `object`
    pub fn new(runner: JobRunner, object: impl Into<String>) -> Self {
        Self {
            runner,
            object: object.into(),
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Set the tick interval, raised to [`MIN_INTERVAL`] if shorter
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Tick until `shutdown` is cancelled, then drain in-flight runs
    ///
    /// The first trigger fires immediately.
    pub async fn run(self, shutdown: CancellationToken) -> SchedulerSummary {
        let mut summary = SchedulerSummary::default();
        let mut tasks: JoinSet<bool> = JoinSet::new();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            object = %self.object,
            interval_ms = self.interval.as_millis() as u64,
            "scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    summary.ticks += 1;
                    debug!(object = %self.object, tick = summary.ticks, "trigger fired");

                    let runner = self.runner.clone();
                    let object = self.object.clone();
                    tasks.spawn(async move { runner.run(&object).await.is_some() });
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                record(&mut summary, joined);
            }
        }

        if !tasks.is_empty() {
            info!(in_flight = tasks.len(), "waiting for in-flight runs");
        }
        while let Some(joined) = tasks.join_next().await {
            record(&mut summary, joined);
        }

        info!(
            ticks = summary.ticks,
            completed = summary.completed,
            skipped = summary.skipped,
            "scheduler stopped"
        );
        summary
    }
}

fn record(summary: &mut SchedulerSummary, joined: Result<bool, tokio::task::JoinError>) {
    match joined {
        Ok(true) => summary.completed += 1,
        Ok(false) => summary.skipped += 1,
        Err(e) => warn!(error = %e, "run task aborted"),
    }
}

/// Wait for SIGINT or SIGTERM (ctrl-c elsewhere)
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigint, mut sigterm) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to install signal handlers, using ctrl-c");
                return ctrl_c().await;
            }
        };

    tokio::select! {
        _ = sigint.recv() => info!(signal = "SIGINT", "signal received"),
        _ = sigterm.recv() => info!(signal = "SIGTERM", "signal received"),
    }
}

/// Wait for SIGINT or SIGTERM (ctrl-c elsewhere)
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(signal = "ctrl-c", "signal received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
