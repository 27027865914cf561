//! Per-file records and volume capacity figures.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One regular file that was successfully stat-ed during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full path of the file.
    pub path: PathBuf,
    /// Bytes counted toward the scan total.
    pub size_bytes: u64,
    /// Last access time as reported by the platform.
    pub last_accessed: SystemTime,
}

impl FileRecord {
    /// Create a new file record.
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64, last_accessed: SystemTime) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            last_accessed,
        }
    }
}

/// Inode information for hardlink detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InodeInfo {
    /// Inode number.
    pub inode: u64,
    /// Device ID.
    pub device: u64,
}

impl InodeInfo {
    /// Create new inode info.
    pub fn new(inode: u64, device: u64) -> Self {
        Self { inode, device }
    }
}

/// Capacity of the volume hosting a path, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl VolumeUsage {
    /// Create volume usage from platform figures.
    pub fn new(total_bytes: u64, used_bytes: u64, free_bytes: u64) -> Self {
        Self {
            total_bytes,
            used_bytes,
            free_bytes,
        }
    }

    /// All-zero usage, reported when the volume cannot be queried.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Check if every figure is zero.
    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_volume() {
        let usage = VolumeUsage::zeroed();
        assert!(usage.is_zeroed());
        assert!(!VolumeUsage::new(10, 5, 5).is_zeroed());
    }
}
