//! Registered config file metadata

use configur_fs::{ConfigFormat, NormalizedPath};

use crate::error::{Error, Result};

/// Metadata about one registered config file.
///
/// Built once at registration and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFileDescriptor {
    id: String,
    path: NormalizedPath,
    file_name: String,
    stem: String,
    extension: String,
    format: ConfigFormat,
}

impl ConfigFileDescriptor {
    /// Describe the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if `path` is not an existing file
    /// - [`Error::UnsupportedFormat`] if the extension is not ini, php or json
    pub fn from_path(path: impl Into<NormalizedPath>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::FileNotFound {
                name: path.to_string(),
            });
        }

        let extension = path.extension().unwrap_or_default().to_string();
        let format =
            ConfigFormat::from_extension(&extension).ok_or_else(|| Error::UnsupportedFormat {
                extension: extension.clone(),
            })?;

        let file_name = path.file_name().unwrap_or_default().to_string();
        let stem = path.stem().unwrap_or_default().to_string();

        Ok(Self {
            id: stem.to_lowercase(),
            path,
            file_name,
            stem,
            extension,
            format,
        })
    }

    /// Lowercased file stem; the registry key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path as given at registration.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without extension, original case.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Extension as written on disk.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn dir(&self) -> Option<NormalizedPath> {
        self.path.parent()
    }
}
