//! Shared test utilities for the configur workspace.
//!
//! A dev-dependency only, never published.
//!
//! - [`dir`]: [`TestConfigDir`] builder for config folders on disk
//! - [`fixtures`]: INI sources reused across suites

pub mod dir;
pub mod fixtures;

pub use dir::TestConfigDir;
