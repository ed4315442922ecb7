//! Error types for alloy.

use std::path::PathBuf;

use crate::patterns::PatternError;
use crate::walker::WalkError;

/// Top-level error type for alloy operations.
#[derive(Debug, thiserror::Error)]
pub enum AlloyError {
    #[error("root path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(WalkError),

    #[error("ignore patterns: {0}")]
    Patterns(#[from] PatternError),

    #[error("failed to write {0}: {1}")]
    Output(PathBuf, #[source] std::io::Error),
}

impl From<WalkError> for AlloyError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::NotFound { path } => AlloyError::RootNotFound(path),
            WalkError::NotADirectory { path } => AlloyError::NotADirectory(path),
            other => AlloyError::Walk(other),
        }
    }
}

/// Map an error to its exit code.
pub fn exit_code(error: &AlloyError) -> i32 {
    match error {
        AlloyError::RootNotFound(_) => 3,
        AlloyError::NotADirectory(_) => 2,
        AlloyError::Io(_) => 1,
        AlloyError::Walk(WalkError::PermissionDenied { .. }) => 4,
        AlloyError::Walk(_) => 2,
        AlloyError::Patterns(_) => 1,
        AlloyError::Output(..) => 1,
    }
}
