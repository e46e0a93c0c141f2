use std::path::PathBuf;
use thiserror::Error;

pub type StageResult<T> = Result<T, StageError>;

/// Errors raised while staging paths or planning a paste.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Cannot stage an empty path set")]
    EmptyStage,

    #[error("Invalid source path (no file name): {0}")]
    InvalidPath(PathBuf),
}
