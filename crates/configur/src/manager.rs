//! Per-file accessor façades
//!
//! [`ConfigManager`] is the default manager: it binds a file path to its
//! parser and forwards every call. Custom managers wrap a `ConfigManager`,
//! inherit the forwarding through the [`Manager`] trait's provided methods,
//! and add their own domain methods on top.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use configur_fs::NormalizedPath;

use crate::error::{Error, Result};
use crate::parser::ConfigParser;
use crate::value::{ConfigData, Section, Value};

/// The default manager.
pub struct ConfigManager {
    path: NormalizedPath,
    parser: Box<dyn ConfigParser>,
}

impl ConfigManager {
    /// Type name of the default manager, as known to a [`ManagerCatalog`].
    pub const TYPE_NAME: &'static str = "ConfigManager";

    pub fn new(path: impl Into<NormalizedPath>, parser: Box<dyn ConfigParser>) -> Self {
        Self {
            path: path.into(),
            parser,
        }
    }

    pub fn parser(&self) -> &dyn ConfigParser {
        self.parser.as_ref()
    }

    pub fn parser_mut(&mut self) -> &mut dyn ConfigParser {
        self.parser.as_mut()
    }
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.path)
            .field("format", &self.parser.format())
            .finish()
    }
}

/// `Any` access for managers, implemented for every sized manager type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Accessor surface shared by the default and custom managers.
///
/// Implementors only provide access to the wrapped [`ConfigManager`]; all
/// reads and writes are forwarded to the bound parser.
pub trait Manager: AsAny + Send {
    fn base(&self) -> &ConfigManager;

    fn base_mut(&mut self) -> &mut ConfigManager;

    /// Name of the concrete manager type
    fn type_name(&self) -> &'static str;

    /// File this manager is bound to
    fn path(&self) -> &NormalizedPath {
        &self.base().path
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.base().parser.get_value(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.base_mut().parser.set_value(name, value)
    }

    fn get_all(&self) -> &ConfigData {
        self.base().parser.get_all()
    }

    fn overwrite(&mut self, data: ConfigData) -> Result<()> {
        self.base_mut().parser.overwrite(data)
    }

    fn set_json(&mut self, name: &str, json: serde_json::Value) -> Result<()> {
        self.base_mut().parser.set_json(name, json)
    }

    fn overwrite_json(&mut self, json: serde_json::Value) -> Result<()> {
        self.base_mut().parser.overwrite_json(json)
    }

    fn flush(&mut self) -> Result<()> {
        self.base_mut().parser.flush()
    }

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.get(name).and_then(Value::as_section)
    }
}

impl Manager for ConfigManager {
    fn base(&self) -> &ConfigManager {
        self
    }

    fn base_mut(&mut self) -> &mut ConfigManager {
        self
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }
}

impl dyn Manager {
    pub fn is<T: Manager>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }

    pub fn downcast_ref<T: Manager>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref()
    }

    pub fn downcast_mut<T: Manager>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut()
    }
}

impl fmt::Debug for dyn Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("type", &self.type_name())
            .field("path", self.path())
            .finish()
    }
}

/// A manager that can replace the default one for matching files.
///
/// The registry picks a custom manager when the name derived from
/// [`CustomManager::TYPE_NAME`] (see [`selection_key`]) equals the
/// lowercased stem of the file being resolved.
pub trait CustomManager: Manager + Sized {
    const TYPE_NAME: &'static str;

    fn from_base(base: ConfigManager) -> Self;
}

/// Registration handle for a custom manager type.
#[derive(Debug, Clone, Copy)]
pub struct ManagerType {
    type_id: TypeId,
    name: &'static str,
    build: fn(ConfigManager) -> Box<dyn Manager>,
}

impl ManagerType {
    pub fn of<T: CustomManager>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::TYPE_NAME,
            build: build::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Lowercased file stem this manager is selected for.
    pub fn selection_key(&self) -> String {
        selection_key(self.name)
    }

    pub(crate) fn instantiate(&self, base: ConfigManager) -> Box<dyn Manager> {
        (self.build)(base)
    }
}

impl PartialEq for ManagerType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ManagerType {}

fn build<T: CustomManager>(base: ConfigManager) -> Box<dyn Manager> {
    Box::new(T::from_base(base))
}

/// Derive the file key a manager type name selects.
///
/// Any module path is dropped, then trailing characters found in
/// `"Manager"` and then trailing characters found in `"Configur"` are
/// trimmed, and the rest is lowercased. The trims remove characters, not
/// exact suffixes: `DbManager` gives `db`, while `CacheManager` gives
/// `cach`.
pub fn selection_key(type_name: &str) -> String {
    let short = type_name.rsplit("::").next().unwrap_or(type_name);
    short
        .trim_end_matches(|c: char| "Manager".contains(c))
        .trim_end_matches(|c: char| "Configur".contains(c))
        .to_lowercase()
}

enum CatalogEntry {
    Default,
    Custom(ManagerType),
}

/// Manager types that can be registered by name, e.g. from a settings file.
pub struct ManagerCatalog {
    entries: HashMap<&'static str, CatalogEntry>,
}

impl Default for ManagerCatalog {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert(ConfigManager::TYPE_NAME, CatalogEntry::Default);
        Self { entries }
    }
}

impl ManagerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`ManagerCatalog::register`].
    pub fn with<T: CustomManager>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Make `T` available by its type name.
    ///
    /// Returns `false` and leaves the catalog unchanged when `T` claims the
    /// default manager's name, which stays reserved.
    pub fn register<T: CustomManager>(&mut self) -> bool {
        if T::TYPE_NAME == ConfigManager::TYPE_NAME {
            tracing::warn!(
                manager = T::TYPE_NAME,
                "Refusing to register a custom manager under the default manager's name"
            );
            return false;
        }
        self.entries
            .insert(T::TYPE_NAME, CatalogEntry::Custom(ManagerType::of::<T>()));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Find the custom manager type registered as `name`.
    ///
    /// # Errors
    ///
    /// - [`Error::ManagerNotFound`] if no type has that name
    /// - [`Error::ManagerNotSupported`] if the name is the default manager
    pub fn lookup(&self, name: &str) -> Result<ManagerType> {
        match self.entries.get(name) {
            Some(CatalogEntry::Custom(manager)) => Ok(*manager),
            Some(CatalogEntry::Default) => Err(Error::ManagerNotSupported {
                name: name.to_string(),
            }),
            None => Err(Error::ManagerNotFound {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for ManagerCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("ManagerCatalog").field("names", &names).finish()
    }
}
