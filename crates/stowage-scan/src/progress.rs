//! Aggregation progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Snapshot of an aggregation in flight.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of file records produced so far.
    pub files_scanned: u64,
    /// Number of directories entered so far.
    pub dirs_scanned: u64,
    /// Bytes counted so far.
    pub bytes_scanned: u64,
    /// Most recent path handled.
    pub current_path: PathBuf,
    /// Number of skipped entries so far.
    pub errors_count: u64,
    /// Time elapsed since the aggregation started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut progress = ScanProgress::new();
        assert_eq!(progress.files_per_second(), 0.0);

        progress.files_scanned = 100;
        progress.elapsed = Duration::from_secs(2);
        assert_eq!(progress.files_per_second(), 50.0);
    }
}
