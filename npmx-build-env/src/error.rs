//! # Build Environment Errors

use std::path::PathBuf;

/// Failures while resolving build metadata. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum BuildEnvError {
    #[error("Failed to read last-modified time of {path}: {source}")]
    FileTimestamp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Git metadata unavailable: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository has no commits at {path}")]
    NoCommit { path: PathBuf },

    #[error("Build metadata task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type BuildEnvResult<T> = Result<T, BuildEnvError>;
