//! Error types for scanning operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Path does not exist or vanished before it could be checked.
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root of the traversal is missing or is not a directory.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Report assembly was attempted with a required input absent.
    #[error("Incomplete report: missing {missing}")]
    IncompleteReport { missing: &'static str },

    /// The caller cancelled the scan.
    #[error("Scan cancelled")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::PathNotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error came from caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<derive_builder::UninitializedFieldError> for ScanError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Self::IncompleteReport {
            missing: err.field_name(),
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Entry disappeared between listing and stat.
    NotFound,
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// Directory on another filesystem, left unread.
    OtherFilesystem,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Classify a failed stat into a warning.
    pub fn from_stat_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            std::io::ErrorKind::NotFound => WarningKind::NotFound,
            _ => WarningKind::MetadataError,
        };
        Self {
            message: format!("Cannot stat {}: {error}", path.display()),
            path,
            kind,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(path, message, WarningKind::ReadError)
    }

    /// Create a warning for a mount point the walk did not enter.
    pub fn other_filesystem(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Not crossing into another filesystem: {}", path.display()),
            path,
            kind: WarningKind::OtherFilesystem,
        }
    }
}
