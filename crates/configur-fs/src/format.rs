//! Config file format detection

use std::fmt;

/// Config file formats recognised at registration time.
///
/// Only [`ConfigFormat::Ini`] has a parser; PHP and JSON files can be
/// registered but fail when they are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    Ini,
    Php,
    Json,
}

impl ConfigFormat {
    /// Detect format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ini" => Some(Self::Ini),
            "php" => Some(Self::Php),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Canonical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ini => "ini",
            Self::Php => "php",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
