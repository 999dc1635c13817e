//! Configuration file aggregation
//!
//! Register config files one by one or by scanning folders, then resolve
//! them by name to managers that read and write their values. INI files
//! are parsed into an ordered, at most three levels deep structure and
//! written back under an advisory lock on every change.
//!
//! ```no_run
//! use configur::{Configur, ConfigurSettings, Manager};
//!
//! let configur = Configur::new(ConfigurSettings::new().with_file("conf/db.ini"))?;
//! let mut db = configur.resolve("DB")?;
//! let host = db.get_str("host").unwrap_or("localhost").to_string();
//! db.set("port", 5432.into())?;
//! # let _ = host;
//! # Ok::<(), configur::Error>(())
//! ```

pub mod descriptor;
pub mod error;
pub mod ini;
pub mod logging;
pub mod manager;
pub mod parser;
pub mod registry;
pub mod settings;
pub mod value;

pub use configur_fs::{ConfigFormat, LockConfig, NormalizedPath};
pub use descriptor::ConfigFileDescriptor;
pub use error::{Error, Result};
pub use manager::{
    ConfigManager, CustomManager, Manager, ManagerCatalog, ManagerType, selection_key,
};
pub use parser::{ConfigParser, IniParser, WritePolicy, open_parser};
pub use registry::Configur;
pub use settings::ConfigurSettings;
pub use value::{ArrayKey, ConfigData, Entry, Scalar, Section, SubArray, Value};
