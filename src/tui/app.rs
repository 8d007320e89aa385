//! Application state for the TUI.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::batch::{BatchExecutor, BatchStatus, BatchSummary, JobOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::project::{Disposition, DispositionStore, ProjectRecord};
use crate::scanner::{IncrementalScanner, ScanOptions, ScanSink, ScanStatus};

/// Where the app is in the scan-select-run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The scanner is running a slice per tick.
    Scanning,
    /// Scan finished; dispositions are being chosen.
    Selecting,
    /// A batch is running.
    Working,
    /// The batch finished; showing its summary.
    Done,
}

/// The current UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal navigation mode.
    Normal,
    /// Asking whether to run the batch.
    Confirm,
    /// Help overlay mode.
    Help,
}

/// Scan sink keeping the latest values for rendering.
#[derive(Debug, Default, Clone)]
pub struct ScanView {
    pub progress: f64,
    pub found: usize,
    pub latest: Option<String>,
    pub complete: bool,
}

impl ScanSink for ScanView {
    fn on_progress(&mut self, percent: f64) {
        self.progress = percent;
    }

    fn on_project_found(&mut self, record: &ProjectRecord) {
        self.found += 1;
        self.latest = Some(record.name());
    }

    fn on_scan_complete(&mut self) {
        self.complete = true;
    }
}

/// Main application state for the TUI.
pub struct App {
    /// Root directory being searched.
    pub root: PathBuf,

    /// Projects found by the current scan.
    pub store: DispositionStore,

    /// Latest scan notifications.
    pub scan: ScanView,

    pub phase: Phase,

    /// Current UI mode.
    pub mode: Mode,

    /// Currently selected index in the store.
    pub selected: usize,

    /// Jobs finished and total for the running batch.
    pub batch_progress: (usize, usize),

    /// Summary of the last batch.
    pub summary: Option<BatchSummary>,

    /// Failed jobs of the last batch.
    pub failures: Vec<JobOutcome>,

    /// Application should quit.
    pub should_quit: bool,

    /// Status message to display.
    pub status_message: Option<String>,

    scanner: IncrementalScanner,
    executor: BatchExecutor,
    batch_done: Rc<Cell<bool>>,
}

impl App {
    /// Create a new App instance. No scan is started.
    pub fn new(root: PathBuf, config: &Config) -> Result<Self> {
        Ok(Self {
            root,
            store: DispositionStore::new(),
            scan: ScanView::default(),
            phase: Phase::Selecting,
            mode: Mode::Normal,
            selected: 0,
            batch_progress: (0, 0),
            summary: None,
            failures: Vec::new(),
            should_quit: false,
            status_message: None,
            scanner: IncrementalScanner::new(ScanOptions::from(&config.scanner)),
            executor: BatchExecutor::from_config(config)?,
            batch_done: Rc::new(Cell::new(false)),
        })
    }

    /// Start scanning the root, replacing any previous results.
    pub fn start_scan(&mut self) -> Result<()> {
        self.scanner.start(&self.root, &mut self.store)?;
        self.scan = ScanView::default();
        self.selected = 0;
        self.summary = None;
        self.failures.clear();
        self.status_message = None;
        self.phase = Phase::Scanning;
        Ok(())
    }

    /// Rescan unless a batch is running.
    pub fn trigger_rescan(&mut self) {
        if self.phase == Phase::Working {
            self.status_message = Some("Wait for the running batch to finish".to_string());
            return;
        }

        if let Err(e) = self.start_scan() {
            self.status_message = Some(format!("Scan failed: {}", e));
        }
    }

    /// Advance whatever is running by one step. Called once per frame.
    pub fn tick(&mut self) {
        match self.phase {
            Phase::Scanning => {
                if self.scanner.resume(&mut self.store, &mut self.scan) == ScanStatus::Complete {
                    self.phase = Phase::Selecting;
                    let stats = self.scanner.stats();
                    self.status_message = Some(format!(
                        "Found {} project{} in {} directories",
                        stats.found,
                        if stats.found == 1 { "" } else { "s" },
                        stats.visited
                    ));
                }
            }
            Phase::Working => {
                if let BatchStatus::Running {
                    total, finished, ..
                } = self.executor.poll()
                {
                    self.batch_progress = (finished, total);
                }

                if self.batch_done.get() {
                    self.finish_batch();
                }
            }
            Phase::Selecting | Phase::Done => {}
        }
    }

    /// Get the currently selected record, if any.
    pub fn selected_record(&self) -> Option<&ProjectRecord> {
        self.store.get(self.selected)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.store.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.store.len() - 1;
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, last as isize) as usize;
    }

    pub fn select_last(&mut self) {
        self.selected = self.store.len().saturating_sub(1);
    }

    fn can_edit(&self) -> bool {
        matches!(self.phase, Phase::Scanning | Phase::Selecting)
    }

    /// Cycle the selected record's disposition.
    pub fn cycle_selected(&mut self) {
        if self.can_edit() {
            self.store.cycle_at(self.selected);
        }
    }

    pub fn set_selected(&mut self, disposition: Disposition) {
        if self.can_edit() {
            self.store.set_disposition_at(self.selected, disposition);
        }
    }

    pub fn set_all(&mut self, disposition: Disposition) {
        if !self.can_edit() {
            return;
        }
        for index in 0..self.store.len() {
            self.store.set_disposition_at(index, disposition);
        }
    }

    /// Ask for confirmation if there is anything to run.
    pub fn request_run(&mut self) {
        match self.phase {
            Phase::Scanning => {
                self.status_message = Some("Wait for the scan to finish".to_string());
            }
            Phase::Selecting if self.store.counts().actionable() == 0 => {
                self.status_message = Some("Mark projects to archive or delete first".to_string());
            }
            Phase::Selecting => self.mode = Mode::Confirm,
            Phase::Working | Phase::Done => {}
        }
    }

    /// Start the batch for the current dispositions.
    pub fn run_batch(&mut self) {
        self.batch_done.set(false);
        let done = Rc::clone(&self.batch_done);

        match self.executor.start(&self.store, move || done.set(true)) {
            Ok(total) => {
                self.batch_progress = (0, total);
                self.phase = Phase::Working;
                self.status_message = None;
            }
            Err(e) => {
                self.status_message = Some(format!("Could not start batch: {}", e));
            }
        }
    }

    /// Whether quitting now would abandon a running batch.
    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Working
    }

    fn finish_batch(&mut self) {
        let outcomes = self.executor.take_outcomes();
        let summary = BatchSummary::from_outcomes(&outcomes);

        self.failures = outcomes.into_iter().filter(|o| o.is_failure()).collect();
        self.status_message = Some(format!(
            "Archived {}, deleted {}, failed {}",
            summary.archived_count, summary.deleted_count, summary.failed_count
        ));
        self.summary = Some(summary);
        self.phase = Phase::Done;
    }
}
