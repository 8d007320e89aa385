//! Bounded, pollable execution of a batch of archive/delete jobs.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::archiver::Archiver;
use super::executor::{BatchJob, FsJobRunner, JobOutcome, JobRunner};
use crate::config::Config;
use crate::error::{Result, SweeperError};
use crate::project::DispositionStore;

/// Default cap on simultaneously running jobs.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// State of the executor after a call to [`BatchExecutor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// No batch has been started, or the last one already completed.
    Idle,
    /// Jobs are still queued or running.
    Running {
        total: usize,
        queued: usize,
        in_flight: usize,
        finished: usize,
    },
    /// Every job finished during this poll and the completion callback ran.
    Complete,
}

/// Summary of batch outcomes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of projects archived.
    pub archived_count: usize,
    /// Number of projects deleted.
    pub deleted_count: usize,
    /// Number of failed jobs.
    pub failed_count: usize,
    /// Total size of the archives written.
    pub archive_bytes: u64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[JobOutcome]) -> Self {
        let mut summary = Self::default();

        for outcome in outcomes {
            match outcome {
                JobOutcome::Archived { bytes, .. } => {
                    summary.archived_count += 1;
                    summary.archive_bytes += bytes;
                }
                JobOutcome::Deleted { .. } => summary.deleted_count += 1,
                JobOutcome::Failed { .. } => summary.failed_count += 1,
            }
        }

        summary
    }
}

struct ActiveBatch {
    queued: VecDeque<BatchJob>,
    in_flight: usize,
    total: usize,
    tx: Sender<JobOutcome>,
    rx: Receiver<JobOutcome>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

/// Runs batch jobs on a worker pool with a cap on how many are in flight.
///
/// The executor never blocks its caller: [`start`](Self::start) only queues
/// work, and each [`poll`](Self::poll) reaps finished jobs, admits queued
/// ones up to the cap and, once nothing is left, runs the completion callback
/// exactly once. A failing or panicking job is recorded as
/// [`JobOutcome::Failed`] and never stops the batch.
pub struct BatchExecutor {
    runner: Arc<dyn JobRunner>,
    pool: rayon::ThreadPool,
    max_in_flight: usize,
    batch: Option<ActiveBatch>,
    outcomes: Vec<JobOutcome>,
}

impl BatchExecutor {
    /// Create an executor. `worker_threads == 0` sizes the pool to the cap.
    pub fn new(
        runner: Arc<dyn JobRunner>,
        max_in_flight: usize,
        worker_threads: usize,
    ) -> Result<Self> {
        let max_in_flight = max_in_flight.max(1);
        let threads = if worker_threads == 0 {
            max_in_flight
        } else {
            worker_threads
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sweeper-job-{i}"))
            .build()
            .map_err(|e| SweeperError::WorkerPool(e.to_string()))?;

        Ok(Self {
            runner,
            pool,
            max_in_flight,
            batch: None,
            outcomes: Vec::new(),
        })
    }

    /// Executor running real archive/delete jobs as configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let runner = FsJobRunner::new(Archiver::from_config(&config.archive));
        Self::new(
            Arc::new(runner),
            config.batch.max_in_flight,
            config.batch.effective_worker_threads(),
        )
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn is_running(&self) -> bool {
        self.batch.is_some()
    }

    /// Snapshot the actionable records of `store` and queue a job for each.
    ///
    /// Returns the number of jobs queued. Nothing is dispatched until the next
    /// [`poll`](Self::poll).
    pub fn start(
        &mut self,
        store: &DispositionStore,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<usize> {
        if self.batch.is_some() {
            return Err(SweeperError::BatchInProgress);
        }

        let jobs = BatchJob::snapshot(store);
        let total = jobs.len();
        let (tx, rx) = mpsc::channel();

        tracing::info!(jobs = total, cap = self.max_in_flight, "Batch started");

        self.outcomes.clear();
        self.batch = Some(ActiveBatch {
            queued: jobs.into(),
            in_flight: 0,
            total,
            tx,
            rx,
            on_complete: Some(Box::new(on_complete)),
        });

        Ok(total)
    }

    /// Advance the batch without blocking.
    pub fn poll(&mut self) -> BatchStatus {
        let Self {
            runner,
            pool,
            max_in_flight,
            batch,
            outcomes,
        } = self;

        let Some(active) = batch.as_mut() else {
            return BatchStatus::Idle;
        };

        while let Ok(outcome) = active.rx.try_recv() {
            active.in_flight -= 1;
            outcomes.push(outcome);
        }

        while active.in_flight < *max_in_flight {
            let Some(job) = active.queued.pop_front() else {
                break;
            };

            tracing::debug!(path = %job.path.display(), disposition = %job.disposition, "Dispatching job");
            let runner = Arc::clone(runner);
            let tx = active.tx.clone();
            pool.spawn(move || {
                let outcome = run_guarded(runner.as_ref(), &job);
                // The receiver only goes away if the executor was dropped.
                let _ = tx.send(outcome);
            });
            active.in_flight += 1;
        }

        if !active.queued.is_empty() || active.in_flight > 0 {
            return BatchStatus::Running {
                total: active.total,
                queued: active.queued.len(),
                in_flight: active.in_flight,
                finished: outcomes.len(),
            };
        }

        let on_complete = batch.take().and_then(|mut b| b.on_complete.take());
        let summary = BatchSummary::from_outcomes(outcomes);
        tracing::info!(
            archived = summary.archived_count,
            deleted = summary.deleted_count,
            failed = summary.failed_count,
            "Batch complete"
        );

        if let Some(callback) = on_complete {
            callback();
        }
        BatchStatus::Complete
    }

    /// Outcomes of the current or last batch, leaving none behind.
    pub fn take_outcomes(&mut self) -> Vec<JobOutcome> {
        std::mem::take(&mut self.outcomes)
    }

    /// Start a batch and poll it every `tick` until it completes.
    pub fn run_blocking(
        &mut self,
        store: &DispositionStore,
        on_complete: impl FnOnce() + 'static,
        tick: Duration,
    ) -> Result<Vec<JobOutcome>> {
        self.start(store, on_complete)?;

        loop {
            match self.poll() {
                BatchStatus::Running { .. } => thread::sleep(tick),
                BatchStatus::Complete | BatchStatus::Idle => break,
            }
        }

        Ok(self.take_outcomes())
    }
}

/// Run one job, turning errors and panics into a failed outcome.
fn run_guarded(runner: &dyn JobRunner, job: &BatchJob) -> JobOutcome {
    let error = match panic::catch_unwind(AssertUnwindSafe(|| runner.run(job))) {
        Ok(Ok(outcome)) => return outcome,
        Ok(Err(e)) => e.to_string(),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            format!("job panicked: {message}")
        }
    };

    tracing::warn!(
        "Failed to {} {}: {}",
        job.disposition,
        job.path.display(),
        error
    );

    JobOutcome::Failed {
        path: job.path.clone(),
        disposition: job.disposition,
        error,
    }
}
