//! [`TestConfigDir`] builder for config folder scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding config files, with helpers for setup and
/// assertion. Removed when dropped.
///
/// # Example
///
/// ```rust,no_run
/// use configur_test_utils::TestConfigDir;
///
/// let dir = TestConfigDir::new()
///     .with_file("conf/db.ini", "host = \"localhost\"")
///     .with_file("conf/app.ini", "[app]\nname = \"demo\"");
/// dir.assert_file_contains("conf/db.ini", "localhost");
/// ```
pub struct TestConfigDir {
    temp_dir: TempDir,
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Builder-style [`TestConfigDir::write_file`].
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        self.write_file(relative, content);
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent folders.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Create an empty folder at `relative`.
    pub fn create_dir(&self, relative: &str) -> PathBuf {
        let full_path = self.path(relative);
        fs::create_dir_all(&full_path).unwrap();
        full_path
    }

    /// Read `relative` as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, relative: &str) -> String {
        let full_path = self.path(relative);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that the file at `relative` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            self.path(relative).display(),
            content,
            file_content
        );
    }

    /// Assert that the file at `relative` is exactly `content`.
    pub fn assert_file_eq(&self, relative: &str, content: &str) {
        assert_eq!(
            self.read(relative),
            content,
            "Unexpected content in {}",
            self.path(relative).display()
        );
    }
}
