//! Discovered projects and the dispositions assigned to them.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// What should happen to a discovered project when the batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Leave the project alone.
    #[default]
    None,
    /// Zip the project's folders to the destination, then remove it.
    Archive,
    /// Remove the project outright.
    Delete,
}

impl Disposition {
    /// Next disposition in the None -> Archive -> Delete cycle.
    pub fn next(self) -> Self {
        match self {
            Disposition::None => Disposition::Archive,
            Disposition::Archive => Disposition::Delete,
            Disposition::Delete => Disposition::None,
        }
    }

    /// Whether a batch job is dispatched for this disposition.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Disposition::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::None => "none",
            Disposition::Archive => "archive",
            Disposition::Delete => "delete",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A project root found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    path: PathBuf,
    disposition: Disposition,
}

impl ProjectRecord {
    /// Create a record with no disposition.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            disposition: Disposition::None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn set_disposition(&mut self, disposition: Disposition) {
        self.disposition = disposition;
    }

    /// Final path component, used for display and name matching.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Number of records per disposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispositionCounts {
    pub none: usize,
    pub archive: usize,
    pub delete: usize,
}

impl DispositionCounts {
    /// Records that will produce a batch job.
    pub fn actionable(&self) -> usize {
        self.archive + self.delete
    }
}

/// Ordered collection of discovered projects, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct DispositionStore {
    records: Vec<ProjectRecord>,
}

impl DispositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly discovered record and return it.
    pub fn push(&mut self, record: ProjectRecord) -> &ProjectRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ProjectRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Set the disposition of the record at `path`.
    ///
    /// Returns `false` if no record has that path.
    pub fn set_disposition(&mut self, path: &Path, disposition: Disposition) -> bool {
        match self.records.iter_mut().find(|r| r.path == path) {
            Some(record) => {
                record.set_disposition(disposition);
                true
            }
            None => false,
        }
    }

    /// Set the disposition of the record at `index`.
    ///
    /// Returns `false` if `index` is out of range.
    pub fn set_disposition_at(&mut self, index: usize, disposition: Disposition) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.set_disposition(disposition);
                true
            }
            None => false,
        }
    }

    /// Advance the record at `index` to its next disposition.
    pub fn cycle_at(&mut self, index: usize) -> Option<Disposition> {
        let record = self.records.get_mut(index)?;
        let next = record.disposition.next();
        record.set_disposition(next);
        Some(next)
    }

    pub fn counts(&self) -> DispositionCounts {
        let mut counts = DispositionCounts::default();
        for record in &self.records {
            match record.disposition {
                Disposition::None => counts.none += 1,
                Disposition::Archive => counts.archive += 1,
                Disposition::Delete => counts.delete += 1,
            }
        }
        counts
    }
}
