//! Batch jobs and the runner that carries them out.

use std::path::PathBuf;

use super::archiver::Archiver;
use super::remover::force_delete;
use crate::error::Result;
use crate::project::{Disposition, DispositionStore};

/// One archive or delete operation, snapshotted when the batch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub path: PathBuf,
    pub disposition: Disposition,
}

impl BatchJob {
    /// Jobs for every record with an actionable disposition, in store order.
    pub fn snapshot(store: &DispositionStore) -> Vec<BatchJob> {
        store
            .iter()
            .filter(|record| {
                let actionable = record.disposition().is_actionable();
                if !actionable {
                    tracing::trace!(path = %record.path().display(), "No disposition, skipping");
                }
                actionable
            })
            .map(|record| BatchJob {
                path: record.path().to_path_buf(),
                disposition: record.disposition(),
            })
            .collect()
    }
}

/// Result of a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The project was zipped to `archive` and removed.
    Archived {
        path: PathBuf,
        archive: PathBuf,
        bytes: u64,
    },
    /// The project was removed.
    Deleted { path: PathBuf },
    /// The job failed; the batch carried on.
    Failed {
        path: PathBuf,
        disposition: Disposition,
        error: String,
    },
}

impl JobOutcome {
    pub fn path(&self) -> &std::path::Path {
        match self {
            JobOutcome::Archived { path, .. }
            | JobOutcome::Deleted { path }
            | JobOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed { .. })
    }
}

/// Carries out a single batch job on a worker thread.
///
/// Errors returned here are turned into [`JobOutcome::Failed`] by the batch
/// executor; implementations do not need to catch them.
pub trait JobRunner: Send + Sync {
    fn run(&self, job: &BatchJob) -> Result<JobOutcome>;
}

/// Runs jobs against the filesystem: archive or delete.
#[derive(Debug, Clone)]
pub struct FsJobRunner {
    archiver: Archiver,
}

impl FsJobRunner {
    pub fn new(archiver: Archiver) -> Self {
        Self { archiver }
    }
}

impl JobRunner for FsJobRunner {
    fn run(&self, job: &BatchJob) -> Result<JobOutcome> {
        match job.disposition {
            Disposition::Archive => {
                let report = self.archiver.archive(&job.path)?;
                Ok(JobOutcome::Archived {
                    path: job.path.clone(),
                    archive: report.archive_path,
                    bytes: report.bytes,
                })
            }
            Disposition::Delete => {
                force_delete(&job.path)?;
                tracing::info!(path = %job.path.display(), "Deleted project");
                Ok(JobOutcome::Deleted {
                    path: job.path.clone(),
                })
            }
            // Never snapshotted; only reachable for hand-built jobs.
            Disposition::None => Ok(JobOutcome::Failed {
                path: job.path.clone(),
                disposition: Disposition::None,
                error: "job has no disposition".to_string(),
            }),
        }
    }
}
