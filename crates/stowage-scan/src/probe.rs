//! Per-file metadata lookup.

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use stowage_core::InodeInfo;

/// Metadata the aggregator needs from one regular file.
#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    /// Apparent size in bytes.
    pub size: u64,
    /// Last access time.
    pub accessed: SystemTime,
    /// Inode identity, where the platform has one.
    pub inode: Option<InodeInfo>,
    /// Number of hard links to the inode.
    pub nlink: u64,
}

/// Source of per-file metadata.
///
/// Any failure is reported as an [`io::Error`] and treated by the
/// aggregator as a skipped entry.
pub trait FileProbe: Send + Sync {
    /// Stat a single file.
    fn probe(&self, path: &Path) -> io::Result<FileStat>;
}

/// Probe backed by the platform's `stat`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe {
    follow_symlinks: bool,
}

impl FsProbe {
    /// Create a probe; with `follow_symlinks` links are resolved before stat.
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

impl FileProbe for FsProbe {
    fn probe(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = if self.follow_symlinks {
            std::fs::metadata(path)?
        } else {
            std::fs::symlink_metadata(path)?
        };
        stat_from_metadata(&metadata)
    }
}

fn stat_from_metadata(metadata: &Metadata) -> io::Result<FileStat> {
    Ok(FileStat {
        size: metadata.len(),
        accessed: metadata.accessed()?,
        inode: inode_info(metadata),
        nlink: get_nlink(metadata),
    })
}

// Cross-platform metadata helpers

/// Get the device ID from metadata.
#[cfg(unix)]
pub(crate) fn get_dev(metadata: &Metadata) -> u64 {
    metadata.dev()
}

#[cfg(not(unix))]
pub(crate) fn get_dev(_metadata: &Metadata) -> u64 {
    0
}

#[cfg(unix)]
fn inode_info(metadata: &Metadata) -> Option<InodeInfo> {
    Some(InodeInfo::new(metadata.ino(), metadata.dev()))
}

#[cfg(not(unix))]
fn inode_info(_metadata: &Metadata) -> Option<InodeInfo> {
    None
}

#[cfg(unix)]
fn get_nlink(metadata: &Metadata) -> u64 {
    metadata.nlink()
}

#[cfg(not(unix))]
fn get_nlink(_metadata: &Metadata) -> u64 {
    1
}
