//! Core types for stowage.
//!
//! This crate provides the data structures shared by the scanner, the
//! staleness ranker and the report consumers: file records, volume usage,
//! scan configuration, errors and the assembled [`ScanResult`].

mod config;
mod error;
mod record;
mod report;

pub use config::{DEFAULT_STALE_COUNT, ScanConfig, ScanConfigBuilder, ScanConfigBuilderError};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use record::{FileRecord, InodeInfo, VolumeUsage};
pub use report::{ScanResult, ScanResultBuilder, ScanStage};
