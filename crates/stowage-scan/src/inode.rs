//! Inode tracking for hardlink deduplication.

use dashmap::DashSet;
use stowage_core::InodeInfo;

/// Tracks seen inodes so a hardlinked file is counted once.
///
/// Holds (inode, device) pairs in a concurrent set; one tracker lives for
/// exactly one aggregation pass.
#[derive(Debug, Default)]
pub struct InodeTracker {
    seen: DashSet<InodeInfo>,
}

impl InodeTracker {
    /// Create a new inode tracker.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Track an inode. Returns `true` if this is the first time seeing it.
    pub fn track(&self, info: InodeInfo) -> bool {
        self.seen.insert(info)
    }
}
