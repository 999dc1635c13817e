//! Config file registry and manager resolution
//!
//! [`Configur`] keeps the set of known config files keyed by their
//! lowercased stem, plus the custom manager types that may stand in for
//! the default manager. [`Configur::resolve`] turns a logical name into a
//! ready-to-use manager.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use configur_fs::{ConfigFormat, LockConfig, NormalizedPath};

use crate::descriptor::ConfigFileDescriptor;
use crate::error::{Error, Result};
use crate::manager::{ConfigManager, CustomManager, Manager, ManagerCatalog, ManagerType};
use crate::parser::{WritePolicy, open_parser};
use crate::settings::ConfigurSettings;

/// Registry of config files and custom managers.
///
/// # Example
///
/// ```no_run
/// use configur::{Configur, ConfigurSettings, Manager};
///
/// let settings = ConfigurSettings::new().with_folder("conf/");
/// let configur = Configur::new(settings)?;
/// let mut db = configur.resolve("db")?;
/// db.set("host", "localhost".into())?;
/// # Ok::<(), configur::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Configur {
    files: BTreeMap<String, ConfigFileDescriptor>,
    custom_managers: Vec<ManagerType>,
    catalog: ManagerCatalog,
    write_policy: WritePolicy,
    lock: LockConfig,
}

impl Configur {
    /// Build a registry from settings, using the default manager catalog.
    ///
    /// Files are registered first, then folders, then custom managers.
    pub fn new(settings: ConfigurSettings) -> Result<Self> {
        Self::with_catalog(settings, ManagerCatalog::default())
    }

    /// Build a registry whose by-name custom managers resolve through
    /// `catalog`.
    pub fn with_catalog(settings: ConfigurSettings, catalog: ManagerCatalog) -> Result<Self> {
        let mut configur = Self {
            catalog,
            write_policy: settings.write_policy,
            ..Self::default()
        };

        for file in &settings.config_files {
            configur.add_config_file(file)?;
        }
        for folder in &settings.config_folders {
            configur.add_config_folder(folder)?;
        }
        for name in &settings.custom_managers {
            configur.add_custom_manager_by_name(name)?;
        }

        tracing::debug!(
            files = configur.files.len(),
            custom_managers = configur.custom_managers.len(),
            "Configur initialised"
        );
        Ok(configur)
    }

    /// Use `lock` for every parser created by [`Configur::resolve`].
    pub fn with_lock_config(mut self, lock: LockConfig) -> Self {
        self.lock = lock;
        self
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn set_write_policy(&mut self, policy: WritePolicy) {
        self.write_policy = policy;
    }

    /// Register a single config file.
    ///
    /// Returns `false` without changing anything when a file with the same
    /// id (lowercased stem) is already registered.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if the path is not an existing file
    /// - [`Error::UnsupportedFormat`] if the extension is not ini, php or json
    pub fn add_config_file(&mut self, path: impl Into<NormalizedPath>) -> Result<bool> {
        let descriptor = ConfigFileDescriptor::from_path(path)?;
        if self.files.contains_key(descriptor.id()) {
            tracing::debug!(
                id = descriptor.id(),
                path = %descriptor.path(),
                "Config file already registered"
            );
            return Ok(false);
        }

        tracing::debug!(id = descriptor.id(), path = %descriptor.path(), "Registered config file");
        self.files.insert(descriptor.id().to_string(), descriptor);
        Ok(true)
    }

    /// Register every ini/php/json file directly inside `folder`.
    ///
    /// Files are visited in name order; the first failure stops the scan.
    /// Returns the number of newly registered files.
    pub fn add_config_folder(&mut self, folder: impl Into<NormalizedPath>) -> Result<usize> {
        let folder = folder.into();
        if !folder.is_dir() {
            return Err(Error::FolderNotFound {
                path: folder.to_string(),
            });
        }

        let native = folder.to_native();
        let mut candidates: Vec<PathBuf> = fs::read_dir(&native)
            .map_err(|e| configur_fs::Error::io(&native, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_config_extension(path))
            .collect();
        candidates.sort();

        let mut added = 0;
        for candidate in &candidates {
            if self.add_config_file(candidate)? {
                added += 1;
            }
        }

        tracing::debug!(
            folder = %folder,
            found = candidates.len(),
            added,
            "Scanned config folder"
        );
        Ok(added)
    }

    /// Register a custom manager type. Returns `false` if it already is.
    pub fn add_custom_manager<T: CustomManager>(&mut self) -> bool {
        self.add_manager_type(ManagerType::of::<T>())
    }

    /// Register a custom manager type known to the catalog by `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::ManagerNotFound`] if the catalog has no such type
    /// - [`Error::ManagerNotSupported`] if `name` is the default manager
    pub fn add_custom_manager_by_name(&mut self, name: &str) -> Result<bool> {
        let manager = self.catalog.lookup(name)?;
        Ok(self.add_manager_type(manager))
    }

    fn add_manager_type(&mut self, manager: ManagerType) -> bool {
        if self.custom_managers.contains(&manager) {
            return false;
        }
        tracing::debug!(
            manager = manager.name(),
            key = %manager.selection_key(),
            "Registered custom manager"
        );
        self.custom_managers.push(manager);
        true
    }

    /// Resolve `name` (case-insensitive) to a manager bound to its file.
    ///
    /// The file is parsed on every call; the first registered custom
    /// manager whose selection key equals the file's lowercased stem is
    /// used, otherwise the default [`ConfigManager`].
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if no file with that id is registered
    /// - [`Error::UnsupportedFormat`] if the file's format has no parser
    /// - parse and I/O errors from loading the file
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Manager>> {
        let descriptor = self.descriptor(name).ok_or_else(|| Error::FileNotFound {
            name: name.to_string(),
        })?;
        let parser = open_parser(descriptor, self.write_policy, self.lock)?;
        let base = ConfigManager::new(descriptor.path(), parser);

        let file_key = descriptor.stem().to_lowercase();
        let manager: Box<dyn Manager> = match self
            .custom_managers
            .iter()
            .find(|manager| manager.selection_key() == file_key)
        {
            Some(custom) => custom.instantiate(base),
            None => Box::new(base),
        };

        tracing::debug!(
            name,
            path = %descriptor.path(),
            manager = manager.type_name(),
            "Resolved config file"
        );
        Ok(manager)
    }

    /// Descriptor registered under `name` (case-insensitive).
    pub fn descriptor(&self, name: &str) -> Option<&ConfigFileDescriptor> {
        self.files.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ConfigFileDescriptor> {
        self.files.values()
    }

    pub fn custom_managers(&self) -> &[ManagerType] {
        &self.custom_managers
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn has_config_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ConfigFormat::from_extension)
        .is_some()
}
