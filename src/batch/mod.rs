//! Batch execution of project dispositions.
//!
//! This module provides:
//! - Archiving of a project's folders into a zip at a destination
//! - Forced recursive deletion
//! - A pollable executor running jobs on a worker pool with a concurrency cap

mod archiver;
mod executor;
mod orchestrator;
mod remover;

pub use archiver::{ArchiveReport, Archiver, ARCHIVED_FOLDERS};
pub use executor::{BatchJob, FsJobRunner, JobOutcome, JobRunner};
pub use orchestrator::{BatchExecutor, BatchStatus, BatchSummary, DEFAULT_MAX_IN_FLIGHT};
pub use remover::force_delete;
