//! Declarative registry settings

use std::path::PathBuf;

use configur_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::WritePolicy;

/// Settings applied when building a [`Configur`](crate::Configur).
///
/// Every field is optional. Keys are camelCase when loaded from JSON:
///
/// ```json
/// {
///   "configFiles": ["conf/app.ini"],
///   "configFolders": ["conf/env/"],
///   "customManagers": ["DbManager"],
///   "writePolicy": "writeThrough"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurSettings {
    /// Files registered one by one
    pub config_files: Vec<PathBuf>,
    /// Folders scanned for config files
    pub config_folders: Vec<PathBuf>,
    /// Custom manager type names, looked up in the manager catalog
    pub custom_managers: Vec<String>,
    pub write_policy: WritePolicy,
}

impl ConfigurSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    pub fn with_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_folders.push(path.into());
        self
    }

    pub fn with_custom_manager(mut self, name: impl Into<String>) -> Self {
        self.custom_managers.push(name.into());
        self
    }

    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Parse settings from JSON text.
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| Error::InvalidSettings {
            source_name: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl Into<NormalizedPath>) -> Result<Self> {
        let path = path.into();
        let content = io::read_text(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::InvalidSettings {
            source_name: path.to_string(),
            message: e.to_string(),
        })
    }
}
