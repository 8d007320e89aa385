use std::path::PathBuf;

/// One frame of the scanner's explicit work stack.
///
/// Each item owns the half-open slice `[progress_low, progress_high)` of the
/// overall `[0, 1)` progress range. Children split their parent's slice into
/// equal contiguous parts, so the low bound of the next popped item never
/// goes backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub path: PathBuf,
    pub progress_low: f64,
    pub progress_high: f64,
}

impl WorkItem {
    /// The item for the scan root, owning the whole range.
    pub fn root(path: PathBuf) -> Self {
        Self {
            path,
            progress_low: 0.0,
            progress_high: 1.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.progress_high - self.progress_low
    }

    /// Partition this item's range among `children`, keeping their order.
    ///
    /// The last child ends exactly at `progress_high`, so the children cover
    /// the parent's range with no gap.
    pub fn split(&self, children: Vec<PathBuf>) -> Vec<WorkItem> {
        let n = children.len();
        if n == 0 {
            return Vec::new();
        }

        let step = self.width() / n as f64;
        children
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let low = self.progress_low + step * i as f64;
                let high = if i + 1 == n {
                    self.progress_high
                } else {
                    self.progress_low + step * (i + 1) as f64
                };
                WorkItem {
                    path,
                    progress_low: low,
                    progress_high: high,
                }
            })
            .collect()
    }
}
