//! Staleness ranking and report pipeline for stowage.
//!
//! - **Staleness ranking** - pick the least recently accessed files as
//!   archival candidates
//! - **Scan pipeline** - volume inspection, tree aggregation, ranking and
//!   report assembly in one linear run
//!
//! ```rust,no_run
//! use stowage_analyze::{ScanPipeline, ScanConfig};
//!
//! let config = ScanConfig::builder()
//!     .root("/path/to/scan")
//!     .stale_count(10usize)
//!     .build()
//!     .unwrap();
//!
//! let report = ScanPipeline::new(config).run().unwrap();
//!
//! println!("{} bytes in {} files", report.total_file_bytes, report.file_count);
//! for path in &report.stale_candidates {
//!     println!("archive? {}", path.display());
//! }
//! ```

mod pipeline;
pub mod stale;

pub use pipeline::{ScanPipeline, run_scan};
pub use stale::{rank_stale, rank_stale_records, stale_order};

// Re-export core types
pub use stowage_core::{FileRecord, ScanConfig, ScanError, ScanResult, ScanStage};
