use std::time::Duration;

use crate::config::ScannerConfig;

/// Default wall-clock budget for one scanner resumption.
pub const DEFAULT_TIME_SLICE: Duration = Duration::from_millis(5);

/// Configuration options for incremental scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// How long one call to `resume` may run before yielding
    pub time_slice: Duration,

    /// Follow symbolic links to directories
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            time_slice: DEFAULT_TIME_SLICE,
            follow_symlinks: false,
        }
    }
}

impl ScanOptions {
    /// Create a new ScanOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-resumption time budget
    pub fn with_time_slice(mut self, time_slice: Duration) -> Self {
        self.time_slice = time_slice;
        self
    }

    /// Set whether to follow symbolic links
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

impl From<&ScannerConfig> for ScanOptions {
    fn from(config: &ScannerConfig) -> Self {
        Self::new()
            .with_time_slice(config.time_slice())
            .with_follow_symlinks(config.follow_symlinks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ScanOptions::default();
        assert_eq!(opts.time_slice, Duration::from_millis(5));
        assert!(!opts.follow_symlinks);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = ScanOptions::new()
            .with_time_slice(Duration::ZERO)
            .with_follow_symlinks(true);

        assert_eq!(opts.time_slice, Duration::ZERO);
        assert!(opts.follow_symlinks);
    }

    #[test]
    fn test_from_config() {
        let config = ScannerConfig {
            time_slice_ms: 12,
            follow_symlinks: true,
        };
        let opts = ScanOptions::from(&config);
        assert_eq!(opts.time_slice, Duration::from_millis(12));
        assert!(opts.follow_symlinks);
    }
}
