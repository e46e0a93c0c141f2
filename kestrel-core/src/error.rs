//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Interaction Core
//!
//! Defines the error enum shared by the file-system service and the engine.
//! Listing and operation failures both end up as a session-level error string
//! shown to the caller; the variants here keep enough context for diagnostics
//! before that flattening happens.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for navigation and file operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Requested file or directory does not exist.
    #[error("File or directory not found: {0:?}")]
    NotFound(PathBuf),

    /// Permissions error for file/directory access.
    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    /// Directory listing / navigation errors.
    #[error("Navigation failed: cannot access {path:?}: {reason}")]
    NavigationFailed { path: PathBuf, reason: String },

    /// Copy/move/trash/open failures.
    #[error("File operation '{operation}' failed on {path:?}: {reason}")]
    FileOperationFailed {
        operation: String,
        path: PathBuf,
        reason: String,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    /// Create a navigation failure error
    pub fn navigation_failed<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::NavigationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a file operation failure error
    pub fn file_operation_failed<S1, P, S2>(operation: S1, path: P, reason: S2) -> Self
    where
        S1: Into<String>,
        P: Into<PathBuf>,
        S2: Into<String>,
    {
        Self::FileOperationFailed {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

impl From<clipstage::StageError> for AppError {
    fn from(e: clipstage::StageError) -> Self {
        Self::Other(e.to_string())
    }
}
