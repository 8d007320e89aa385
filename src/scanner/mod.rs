//! Incremental, resumable search for project roots.

mod options;
mod sink;
mod walker;
mod work_item;

pub use options::{ScanOptions, DEFAULT_TIME_SLICE};
pub use sink::{ScanEvent, ScanSink};
pub use walker::{IncrementalScanner, ScanStats, ScanStatus};
pub use work_item::WorkItem;
