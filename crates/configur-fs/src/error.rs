//! Error types for configur-fs

use std::path::PathBuf;
use std::time::Duration;

/// Result type for configur-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in configur-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {waited:?} waiting for the write lock on {path}")]
    LockTimeout { path: PathBuf, waited: Duration },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when a rewrite gave up because another writer held the lock.
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}
