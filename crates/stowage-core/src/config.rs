//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Number of stale candidates reported when not configured otherwise.
pub const DEFAULT_STALE_COUNT: usize = 5;

/// Configuration for one scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Directory to scan.
    pub root: PathBuf,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Descend into directories mounted from other filesystems.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub cross_filesystems: bool,

    /// Count a hardlinked inode only once toward the byte total.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub dedupe_hardlinks: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Glob patterns matched against entry names; matches are skipped.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of walker threads (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// How many stale candidates to report.
    #[builder(default = "DEFAULT_STALE_COUNT")]
    #[serde(default = "default_stale_count")]
    pub stale_count: usize,

    /// Keep every file record in the final result.
    #[builder(default = "false")]
    #[serde(default)]
    pub retain_records: bool,
}

fn default_true() -> bool {
    true
}

fn default_stale_count() -> usize {
    DEFAULT_STALE_COUNT
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
            cross_filesystems: true,
            dedupe_hardlinks: true,
            max_depth: None,
            ignore_patterns: Vec::new(),
            threads: 0,
            include_hidden: true,
            stale_count: DEFAULT_STALE_COUNT,
            retain_records: false,
        }
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
