//! Assembled scan results.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanWarning};
use crate::record::{FileRecord, VolumeUsage};

/// Stages of one scan, in the only order they may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScanStage {
    Idle,
    VolumeQueried,
    TreeWalked,
    Ranked,
    Assembled,
    Delivered,
}

impl ScanStage {
    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::VolumeQueried),
            Self::VolumeQueried => Some(Self::TreeWalked),
            Self::TreeWalked => Some(Self::Ranked),
            Self::Ranked => Some(Self::Assembled),
            Self::Assembled => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

/// Storage utilization report for one scanned directory.
///
/// Built through [`ScanResultBuilder`]; building fails with
/// [`ScanError::IncompleteReport`] when `target`, `volume`,
/// `total_file_bytes` or `stale_candidates` was never supplied.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(error = "ScanError"))]
pub struct ScanResult {
    /// Directory that was scanned.
    pub target: PathBuf,

    /// Capacity of the volume hosting the target.
    pub volume: VolumeUsage,

    /// Whether `volume` holds real figures rather than zeroes.
    #[builder(default = "true")]
    pub volume_measured: bool,

    /// Sum of sizes over every record produced by the traversal.
    pub total_file_bytes: u64,

    /// Number of records produced by the traversal.
    #[builder(default)]
    pub file_count: u64,

    /// Least recently accessed files, oldest first.
    pub stale_candidates: Vec<PathBuf>,

    /// Entries that could not be read and were left out of the totals.
    #[builder(default)]
    pub skipped: Vec<ScanWarning>,

    /// Every record, when the scan was configured to keep them.
    #[builder(default)]
    pub files: Vec<FileRecord>,

    /// When the scan finished.
    #[builder(default = "SystemTime::now()")]
    pub scanned_at: SystemTime,

    /// Wall-clock duration of the scan.
    #[builder(default)]
    pub scan_duration: Duration,
}

impl ScanResult {
    /// Start assembling a result.
    pub fn builder() -> ScanResultBuilder {
        ScanResultBuilder::default()
    }

    /// Size reported for the directory itself.
    ///
    /// This is the capacity of the hosting volume, not the sum of the
    /// directory's entries.
    pub fn directory_size(&self) -> u64 {
        self.volume.total_bytes
    }

    /// Fraction of the volume occupied by the scanned files.
    pub fn file_share(&self) -> f64 {
        if self.volume.total_bytes == 0 {
            0.0
        } else {
            self.total_file_bytes as f64 / self.volume.total_bytes as f64
        }
    }

    /// Check if any entries were skipped.
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> ScanResultBuilder {
        let mut builder = ScanResult::builder();
        builder
            .target("/data")
            .volume(VolumeUsage::new(1000, 400, 600))
            .total_file_bytes(250u64)
            .stale_candidates(vec![PathBuf::from("/data/old.txt")]);
        builder
    }

    #[test]
    fn test_stage_order() {
        let mut stage = ScanStage::Idle;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(stage, ScanStage::Delivered);
    }

    #[test]
    fn test_build_complete_report() {
        let result = complete_builder().build().unwrap();
        assert_eq!(result.total_file_bytes, 250);
        assert_eq!(result.directory_size(), 1000);
        assert!(result.volume_measured);
        assert!(!result.has_skipped());
        assert!((result.file_share() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_volume_is_incomplete() {
        let err = ScanResult::builder()
            .target("/data")
            .total_file_bytes(0u64)
            .stale_candidates(Vec::<PathBuf>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, ScanError::IncompleteReport { missing: "volume" }));
    }

    #[test]
    fn test_file_share_on_zeroed_volume() {
        let result = complete_builder()
            .volume(VolumeUsage::zeroed())
            .volume_measured(false)
            .build()
            .unwrap();
        assert_eq!(result.file_share(), 0.0);
        assert_eq!(result.directory_size(), 0);
    }
}
