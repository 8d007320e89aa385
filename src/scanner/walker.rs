use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Result, SweeperError};
use crate::project::{DispositionStore, ProjectClassifier, ProjectRecord, UnityClassifier};

use super::options::ScanOptions;
use super::sink::ScanSink;
use super::work_item::WorkItem;

/// Outcome of one call to [`IncrementalScanner::resume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// The time slice ran out; call `resume` again.
    Pending,
    /// The stack emptied during this call. Completion was reported to the sink.
    Complete,
    /// No scan has been started, or the last one already completed.
    Idle,
}

/// Counters for the current (or last) scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Directories popped from the stack.
    pub visited: usize,
    /// Directories whose children could not be listed.
    pub unreadable: usize,
    /// Project roots found.
    pub found: usize,
}

/// Depth-first project scanner that can be paused between directories.
///
/// Traversal state lives in an explicit stack of [`WorkItem`]s rather than on
/// the call stack, so a host loop can call [`resume`](Self::resume) once per
/// tick and never be blocked for much longer than the configured time slice.
pub struct IncrementalScanner {
    classifier: Box<dyn ProjectClassifier>,
    options: ScanOptions,
    stack: Vec<WorkItem>,
    /// Canonical paths already visited; only filled when following links.
    seen: HashSet<PathBuf>,
    running: bool,
    stats: ScanStats,
}

impl IncrementalScanner {
    /// Create a scanner for Unity projects.
    pub fn new(options: ScanOptions) -> Self {
        Self::with_classifier(Box::new(UnityClassifier), options)
    }

    pub fn with_classifier(classifier: Box<dyn ProjectClassifier>, options: ScanOptions) -> Self {
        Self {
            classifier,
            options,
            stack: Vec::new(),
            seen: HashSet::new(),
            running: false,
            stats: ScanStats::default(),
        }
    }

    /// Begin a new scan of `root`, discarding any scan in progress.
    ///
    /// The root must be an existing directory; otherwise nothing is touched
    /// and the error is returned. On success `store` is cleared.
    pub fn start(&mut self, root: &Path, store: &mut DispositionStore) -> Result<()> {
        let root = root.canonicalize().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SweeperError::PathNotFound(root.to_path_buf()),
            _ => SweeperError::io(root, e),
        })?;

        if !root.is_dir() {
            return Err(SweeperError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        if self.running {
            tracing::info!(
                visited = self.stats.visited,
                "Cancelling in-flight scan for a new one"
            );
        }

        store.clear();
        self.stack.clear();
        self.seen.clear();
        self.stats = ScanStats::default();
        self.stack.push(WorkItem::root(root.clone()));
        self.running = true;

        tracing::info!(root = %root.display(), "Scan started");
        Ok(())
    }

    /// Drop the scan in progress without reporting completion.
    pub fn cancel(&mut self) {
        if self.running {
            tracing::debug!(pending = self.stack.len(), "Scan cancelled");
        }
        self.stack.clear();
        self.seen.clear();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Process directories until the stack empties or the time slice is used.
    ///
    /// At least one directory is visited per call, so a zero time slice still
    /// makes progress.
    pub fn resume(&mut self, store: &mut DispositionStore, sink: &mut dyn ScanSink) -> ScanStatus {
        if !self.running {
            return ScanStatus::Idle;
        }

        let slice_start = Instant::now();
        while let Some(item) = self.stack.pop() {
            self.visit(item, store, sink);

            if !self.stack.is_empty() && slice_start.elapsed() >= self.options.time_slice {
                return ScanStatus::Pending;
            }
        }

        self.running = false;
        self.seen.clear();
        sink.on_progress(100.0);
        sink.on_scan_complete();

        tracing::info!(
            visited = self.stats.visited,
            found = self.stats.found,
            unreadable = self.stats.unreadable,
            "Scan complete"
        );
        ScanStatus::Complete
    }

    /// Start a scan and drive it to the end on the current thread.
    pub fn run_to_completion(
        &mut self,
        root: &Path,
        store: &mut DispositionStore,
        sink: &mut dyn ScanSink,
    ) -> Result<ScanStats> {
        self.start(root, store)?;
        while self.resume(store, sink) == ScanStatus::Pending {}
        Ok(self.stats)
    }

    fn visit(&mut self, item: WorkItem, store: &mut DispositionStore, sink: &mut dyn ScanSink) {
        self.stats.visited += 1;
        sink.on_progress(item.progress_low * 100.0);

        if self.options.follow_symlinks && !self.first_visit(&item.path) {
            tracing::debug!(
                path = %item.path.display(),
                "Skipping directory already reached through a link"
            );
            return;
        }

        if self.classifier.is_project_root(&item.path) {
            tracing::debug!(path = %item.path.display(), kind = self.classifier.id(), "Found project");
            self.stats.found += 1;
            let record = store.push(ProjectRecord::new(item.path));
            sink.on_project_found(record);
            return;
        }

        let children = match self.subdirectories(&item.path) {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!("Could not access directory {}: {}", item.path.display(), e);
                self.stats.unreadable += 1;
                return;
            }
        };

        tracing::trace!(path = %item.path.display(), children = children.len(), "Visited");

        // Pushed in reverse so they pop in name order.
        self.stack.extend(item.split(children).into_iter().rev());
    }

    /// Record the real location of `path`. False if it was visited before,
    /// which is how link cycles back to an ancestor are cut.
    fn first_visit(&mut self, path: &Path) -> bool {
        match path.canonicalize() {
            Ok(real) => self.seen.insert(real),
            // Let the listing report the problem.
            Err(_) => true,
        }
    }

    /// Immediate subdirectories of `path`, sorted by name.
    fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };

            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let child = entry.path();
            let is_dir = if file_type.is_symlink() {
                self.options.follow_symlinks && child.is_dir()
            } else {
                file_type.is_dir()
            };

            if is_dir {
                dirs.push(child);
            }
        }

        dirs.sort();
        Ok(dirs)
    }
}
