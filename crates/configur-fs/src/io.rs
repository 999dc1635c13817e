//! Lock-guarded file rewrites
//!
//! Every persisting parser funnels its writes through [`rewrite`], which
//! takes an advisory exclusive lock on the target before replacing its
//! content. Contending writers back off for a random interval and retry
//! until the lock budget runs out.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::time::{Duration, Instant};

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning for the lock acquisition loop in [`rewrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Total time spent retrying before giving up with `LockTimeout`.
    pub timeout: Duration,
    /// Upper bound of the random sleep between two lock attempts.
    pub max_interval: Duration,
    /// Fsync the file before releasing the lock.
    pub sync: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            max_interval: Duration::from_millis(100),
            sync: true,
        }
    }
}

impl LockConfig {
    /// Sleeps are drawn uniformly from `[0, max_interval]`: a fixed mean of
    /// half the bound with a randomization factor of one.
    fn backoff(&self) -> ExponentialBackoff {
        let mean = self.max_interval / 2;
        ExponentialBackoffBuilder::new()
            .with_initial_interval(mean)
            .with_max_interval(mean)
            .with_multiplier(1.0)
            .with_randomization_factor(1.0)
            .with_max_elapsed_time(Some(self.timeout))
            .build()
    }
}

/// Replace the content of `path` while holding an exclusive advisory lock.
///
/// The file is opened without truncation so that a writer waiting for the
/// lock never clobbers the content of the current holder. Once the lock is
/// held the file is truncated and the whole of `content` is written.
///
/// # Errors
///
/// Returns [`Error::LockTimeout`] if the lock could not be acquired within
/// `config.timeout`; nothing is written in that case.
pub fn rewrite(path: &NormalizedPath, content: &[u8], config: LockConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&native_path)
        .map_err(|e| Error::io(&native_path, e))?;

    let started = Instant::now();
    let mut attempts = 0u32;
    let acquired = backoff::retry(config.backoff(), || {
        attempts += 1;
        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                tracing::trace!(path = %path, attempts, "Lock busy, backing off");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    });

    match acquired {
        Ok(()) => {}
        Err(backoff::Error::Transient { .. }) => {
            let waited = started.elapsed();
            tracing::warn!(path = %path, attempts, ?waited, "Gave up waiting for write lock");
            return Err(Error::LockTimeout {
                path: native_path,
                waited,
            });
        }
        Err(backoff::Error::Permanent(e)) => return Err(Error::io(&native_path, e)),
    }

    let written = write_locked(&mut file, content, config.sync);
    let released = FileExt::unlock(&file);

    written.map_err(|e| Error::io(&native_path, e))?;
    released.map_err(|e| Error::io(&native_path, e))?;

    tracing::trace!(path = %path, bytes = content.len(), attempts, "Rewrote file");
    Ok(())
}

fn write_locked(file: &mut File, content: &[u8], sync: bool) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(content)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Rewrite a file with text content using the default lock settings.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    rewrite(path, content.as_bytes(), LockConfig::default())
}
