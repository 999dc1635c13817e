//! Error types for configur

use std::path::PathBuf;

/// Result type for configur operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while registering, resolving or editing config files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] configur_fs::Error),

    #[error("Config file {name} not found")]
    FileNotFound { name: String },

    #[error("Folder {path} not found")]
    FolderNotFound { path: String },

    #[error("{extension} config files are not supported")]
    UnsupportedFormat { extension: String },

    #[error("Custom manager {name} not found")]
    ManagerNotFound { name: String },

    #[error("Custom manager {name} must be a distinct subtype of the default manager")]
    ManagerNotSupported { name: String },

    #[error("INI files support at most 3 levels of nesting, `{key}` goes deeper")]
    DepthExceeded { key: String },

    #[error("Cannot write `{key}` as INI: {message}")]
    Unwritable { key: String, message: String },

    #[error("Config data must be a mapping of keys to values")]
    NotAMapping,

    #[error("Failed to parse INI at {path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid settings in {source_name}: {message}")]
    InvalidSettings {
        source_name: String,
        message: String,
    },
}

impl From<crate::ini::Unwritable> for Error {
    fn from(e: crate::ini::Unwritable) -> Self {
        Self::Unwritable {
            key: e.key,
            message: e.message,
        }
    }
}

impl Error {
    /// True when a write was dropped because another writer held the lock.
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self, Self::Fs(e) if e.is_lock_timeout())
    }
}
