//! Directory aggregation and volume inspection for stowage.
//!
//! This crate walks a directory tree once and produces the raw material of a
//! storage report:
//!
//! - **Tree aggregation** via jwalk: total bytes of every regular file plus
//!   one [`FileRecord`] (path, size, last access) per file
//! - **Partial-failure tolerance**: files that cannot be stat-ed are skipped
//!   and reported, never fatal
//! - **Hardlink detection** to avoid double-counting
//! - **Cooperative cancellation** through a [`CancellationToken`]
//! - **Volume inspection**: total/used/free bytes of the hosting volume
//!
//! # Example
//!
//! ```rust,no_run
//! use stowage_scan::{TreeAggregator, ScanConfig, inspect_volume};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let aggregate = TreeAggregator::new().aggregate(&config).unwrap();
//! let volume = inspect_volume(&config.root).unwrap();
//!
//! println!("{} bytes in {} files", aggregate.total_file_bytes, aggregate.file_count());
//! println!("{} bytes free on volume", volume.free_bytes);
//! ```
//!
//! # Cancellation
//!
//! ```rust,no_run
//! use stowage_scan::{CancellationToken, ScanConfig, TreeAggregator};
//!
//! let token = CancellationToken::new();
//! let aggregator = TreeAggregator::new().with_cancellation(token.clone());
//!
//! std::thread::spawn(move || token.cancel());
//! let result = aggregator.aggregate(&ScanConfig::new("/"));
//! assert!(result.is_ok() || result.unwrap_err().is_cancelled());
//! ```

mod aggregate;
mod inode;
mod probe;
mod progress;
mod volume;

pub use aggregate::{TreeAggregate, TreeAggregator, aggregate_tree, resolve_root};
pub use inode::InodeTracker;
pub use probe::{FileProbe, FileStat, FsProbe};
pub use progress::ScanProgress;
pub use volume::{inspect_volume, inspect_volume_or_zeroed};

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use stowage_core::{
    FileRecord, ScanConfig, ScanError, ScanWarning, VolumeUsage, WarningKind,
};
