//! Filesystem primitives for Configur
//!
//! Provides normalized path handling, config format detection and the
//! lock-guarded rewrite used by every parser that persists changes.

pub mod error;
pub mod format;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use format::ConfigFormat;
pub use io::LockConfig;
pub use path::NormalizedPath;
