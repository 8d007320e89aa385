//! Subcommand implementations.

pub mod scan;
pub mod sweep;

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::error::Result;
use crate::project::{DispositionStore, ProjectRecord};
use crate::scanner::{IncrementalScanner, ScanOptions, ScanSink, ScanStats};

/// Scan sink drawing a percentage bar on stderr.
pub struct ProgressSink {
    bar: ProgressBar,
    found: usize,
}

impl ProgressSink {
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(100)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar, found: 0 }
    }

    pub fn found(&self) -> usize {
        self.found
    }
}

impl ScanSink for ProgressSink {
    fn on_progress(&mut self, percent: f64) {
        self.bar.set_position(percent.clamp(0.0, 100.0) as u64);
    }

    fn on_project_found(&mut self, record: &ProjectRecord) {
        self.found += 1;
        self.bar
            .set_message(format!("{} found, latest: {}", self.found, record.name()));
    }

    fn on_scan_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Scan `root` into `store` with the configured scanner, showing progress
/// unless `quiet`.
pub fn scan_projects(
    root: &Path,
    config: &Config,
    store: &mut DispositionStore,
    quiet: bool,
) -> Result<ScanStats> {
    let mut scanner = IncrementalScanner::new(ScanOptions::from(&config.scanner));
    let mut sink = ProgressSink::new(quiet);
    scanner.run_to_completion(root, store, &mut sink)
}

/// Shorten a path for table display, keeping its tail.
pub(crate) fn truncate_path(path: &Path, max: usize) -> String {
    let path_str = path.display().to_string();
    let count = path_str.chars().count();
    if count > max && max > 3 {
        let tail: String = path_str.chars().skip(count - (max - 3)).collect();
        format!("...{}", tail)
    } else {
        path_str
    }
}

pub(crate) fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
