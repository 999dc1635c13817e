//! Parser contract and the INI implementation

use configur_fs::{ConfigFormat, LockConfig, NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::descriptor::ConfigFileDescriptor;
use crate::error::{Error, Result};
use crate::ini;
use crate::value::{ConfigData, Value};

/// When mutations reach the disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WritePolicy {
    /// Every `set_value`/`overwrite` rewrites the whole file.
    #[default]
    WriteThrough,
    /// Mutations stay in memory until `flush` is called.
    Deferred,
}

/// Loads, holds, mutates and persists the content of one config file.
pub trait ConfigParser: Send {
    /// Format handled by this parser
    fn format(&self) -> ConfigFormat;

    /// File this parser is bound to
    fn path(&self) -> &NormalizedPath;

    /// Value bound to `name`, if any. Missing keys are not an error.
    fn get_value(&self, name: &str) -> Option<&Value>;

    /// Bind `name` to `value` and persist according to the write policy.
    ///
    /// Input the format cannot represent fails with
    /// [`Error::Unwritable`] before anything is changed.
    fn set_value(&mut self, name: &str, value: Value) -> Result<()>;

    /// The whole in-memory content as of this call.
    fn get_all(&self) -> &ConfigData;

    /// Replace the whole content and persist according to the write policy.
    fn overwrite(&mut self, data: ConfigData) -> Result<()>;

    /// Write pending changes to disk. A no-op when nothing is pending.
    fn flush(&mut self) -> Result<()>;

    /// Whether in-memory changes have not been written yet.
    fn is_dirty(&self) -> bool;

    /// Like [`ConfigParser::set_value`], converting untyped input first.
    ///
    /// Input nested deeper than the format allows fails with
    /// [`Error::DepthExceeded`] before anything is changed.
    fn set_json(&mut self, name: &str, json: serde_json::Value) -> Result<()> {
        let value = Value::try_from_json(name, json)?;
        self.set_value(name, value)
    }

    /// Like [`ConfigParser::overwrite`], converting untyped input first.
    fn overwrite_json(&mut self, json: serde_json::Value) -> Result<()> {
        let data = ConfigData::try_from_json(json)?;
        self.overwrite(data)
    }
}

/// Instantiate the parser matching a descriptor's format.
///
/// PHP and JSON files are accepted at registration but have no parser.
pub fn open_parser(
    descriptor: &ConfigFileDescriptor,
    policy: WritePolicy,
    lock: LockConfig,
) -> Result<Box<dyn ConfigParser>> {
    match descriptor.format() {
        ConfigFormat::Ini => Ok(Box::new(IniParser::with_options(
            descriptor.path(),
            policy,
            lock,
        )?)),
        ConfigFormat::Php | ConfigFormat::Json => Err(Error::UnsupportedFormat {
            extension: descriptor.extension().to_string(),
        }),
    }
}

/// Parser for INI files.
///
/// The file is read once at construction; afterwards the in-memory copy is
/// authoritative and every persist rewrites the file from it under an
/// exclusive lock. Reads never take the lock.
#[derive(Debug)]
pub struct IniParser {
    path: NormalizedPath,
    data: ConfigData,
    policy: WritePolicy,
    lock: LockConfig,
    dirty: bool,
}

impl IniParser {
    /// Load `path` with write-through persistence and default lock settings.
    pub fn open(path: impl Into<NormalizedPath>) -> Result<Self> {
        Self::with_options(path, WritePolicy::default(), LockConfig::default())
    }

    pub fn with_options(
        path: impl Into<NormalizedPath>,
        policy: WritePolicy,
        lock: LockConfig,
    ) -> Result<Self> {
        let path = path.into();
        let data = load(&path)?;
        tracing::trace!(path = %path, keys = data.len(), "Loaded INI file");
        Ok(Self {
            path,
            data,
            policy,
            lock,
            dirty: false,
        })
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    /// Discard in-memory state, including unflushed changes, and read the
    /// file again.
    pub fn reload(&mut self) -> Result<()> {
        self.data = load(&self.path)?;
        self.dirty = false;
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.dirty = true;
        match self.policy {
            WritePolicy::WriteThrough => self.flush(),
            WritePolicy::Deferred => Ok(()),
        }
    }
}

fn load(path: &NormalizedPath) -> Result<ConfigData> {
    let source = io::read_text(path)?;
    ini::parse(&source).map_err(|e| Error::Parse {
        path: path.to_native(),
        line: e.line,
        message: e.message,
    })
}

impl ConfigParser for IniParser {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Ini
    }

    fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn get_value(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    fn set_value(&mut self, name: &str, value: Value) -> Result<()> {
        ini::check_value(name, &value)?;
        self.data.insert(name, value);
        self.persist()
    }

    fn get_all(&self) -> &ConfigData {
        &self.data
    }

    fn overwrite(&mut self, data: ConfigData) -> Result<()> {
        ini::check(&data)?;
        self.data = data;
        self.persist()
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        // Render fully before touching the file
        let content = ini::render(&self.data);
        io::rewrite(&self.path, content.as_bytes(), self.lock)?;
        self.dirty = false;
        tracing::trace!(path = %self.path, bytes = content.len(), "Persisted INI file");
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Section;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn ini_file(content: &str) -> (TempDir, NormalizedPath) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.ini");
        fs::write(&path, content).unwrap();
        (temp, NormalizedPath::new(path))
    }

    #[test]
    fn set_value_is_visible_and_persisted() {
        let (_temp, path) = ini_file("name = \"app\"");
        let mut parser = IniParser::open(&path).unwrap();

        parser.set_value("x", 5.into()).unwrap();
        assert_eq!(parser.get_value("x"), Some(&Value::from(5)));
        assert!(!parser.is_dirty());

        let fresh = IniParser::open(&path).unwrap();
        assert_eq!(fresh.get_value("x"), Some(&Value::from(5)));
        assert_eq!(fresh.get_value("name"), Some(&Value::from("app")));
    }

    #[test]
    fn missing_key_is_none() {
        let (_temp, path) = ini_file("");
        let parser = IniParser::open(&path).unwrap();
        assert_eq!(parser.get_value("absent"), None);
        assert!(parser.get_all().is_empty());
    }

    #[test]
    fn overwrite_replaces_everything() {
        let (_temp, path) = ini_file("old = 1\n[gone]\nx = 1");
        let mut parser = IniParser::open(&path).unwrap();

        let data = ConfigData::new().with("db", Section::new().with("host", "h"));
        parser.overwrite(data.clone()).unwrap();

        assert_eq!(parser.get_all(), &data);
        assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "[db]\r\nhost = \"h\"");
    }

    #[test]
    fn depth_exceeded_leaves_file_and_memory_untouched() {
        let (_temp, path) = ini_file("keep = 1");
        let mut parser = IniParser::open(&path).unwrap();

        let err = parser
            .overwrite_json(json!({"a": {"b": {"c": {"d": 1}}}}))
            .unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { .. }));

        let err = parser
            .set_json("a", json!({"b": {"c": [1, [2]]}}))
            .unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { .. }));

        assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "keep = 1");
        assert_eq!(parser.get_all(), &ConfigData::new().with("keep", 1));
    }

    #[test]
    fn top_level_key_survives_a_fresh_load_next_to_sections() {
        let (_temp, path) = ini_file("[db]\nhost = \"h\"");
        let mut parser = IniParser::open(&path).unwrap();

        parser.set_value("x", 5.into()).unwrap();

        let fresh = IniParser::open(&path).unwrap();
        assert_eq!(fresh.get_value("x"), Some(&Value::from(5)));
        assert_eq!(fresh.get_all().section("db"), Some(&Section::new().with("host", "h")));

        let data = ConfigData::new()
            .with("db", Section::new().with("host", "h"))
            .with("name", "app");
        parser.overwrite(data).unwrap();

        let fresh = IniParser::open(&path).unwrap();
        assert_eq!(fresh.get_value("name"), Some(&Value::from("app")));
        assert_eq!(fresh.get_all().section("db"), Some(&Section::new().with("host", "h")));
    }

    #[test]
    fn line_breaks_are_rejected_before_anything_changes() {
        let (_temp, path) = ini_file("keep = 1");
        let mut parser = IniParser::open(&path).unwrap();

        let err = parser.set_value("motd", "line1\nline2".into()).unwrap_err();
        assert!(matches!(err, Error::Unwritable { ref key, .. } if key == "motd"), "{err}");

        let err = parser
            .overwrite(ConfigData::new().with("db", Section::new().with("bad\nkey", 1)))
            .unwrap_err();
        assert!(matches!(err, Error::Unwritable { .. }), "{err}");

        assert_eq!(parser.get_all(), &ConfigData::new().with("keep", 1));
        assert!(!parser.is_dirty());
        assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "keep = 1");
        assert!(IniParser::open(&path).is_ok());
    }

    #[test]
    fn deferred_policy_waits_for_flush() {
        let (_temp, path) = ini_file("a = 1");
        let mut parser =
            IniParser::with_options(&path, WritePolicy::Deferred, LockConfig::default()).unwrap();

        parser.set_value("b", 2.into()).unwrap();
        assert!(parser.is_dirty());
        assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "a = 1");

        parser.flush().unwrap();
        assert!(!parser.is_dirty());
        assert_eq!(fs::read_to_string(path.to_native()).unwrap(), "a = 1\r\nb = 2");
    }

    #[test]
    fn reload_discards_unflushed_changes() {
        let (_temp, path) = ini_file("a = 1");
        let mut parser =
            IniParser::with_options(&path, WritePolicy::Deferred, LockConfig::default()).unwrap();
        parser.set_value("a", 9.into()).unwrap();

        parser.reload().unwrap();

        assert_eq!(parser.get_value("a"), Some(&Value::from(1)));
        assert!(!parser.is_dirty());
    }

    #[test]
    fn parse_errors_name_file_and_line() {
        let (_temp, path) = ini_file("a = 1\n[broken");
        let err = IniParser::open(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn open_missing_file_is_fs_error() {
        let err = IniParser::open("/nonexistent/app.ini").unwrap_err();
        assert!(matches!(err, Error::Fs(_)));
    }
}
