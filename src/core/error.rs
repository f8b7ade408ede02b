//! Error types for codeframe

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using codeframe's `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors abort the run before (or instead of) producing analysis
/// output. Per-file failures are never represented here — they are captured
/// as `kind=error` records by the orchestrator (see `crate::output`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("usage error: {message}")]
    UsageError { message: String },

    #[error("could not write output: {path}: {source}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code this error should map to, per `spec.md` §6.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InputNotFound { .. } => 1,
            Error::UsageError { .. } => 2,
            _ => 2,
        }
    }
}
