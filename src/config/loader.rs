// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ConvoyError, Result};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (handle uniqueness, `waitOn` resolution, etc.). Use
/// [`load_and_validate`] for that.
///
/// A read failure is reported as [`ConvoyError::ConfigDiscovery`] so that
/// `main` can exit with the distinguished pre-run status.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConvoyError::ConfigDiscovery {
        path: path.to_path_buf(),
        source,
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Checks, in declaration order, for:
///   - missing or duplicate handles,
///   - missing commands,
///   - `waitOn` references that do not resolve strictly earlier,
///   - duplicate stdin prefixes.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `Convoy.toml` in the current working
/// directory, but this function exists so you can later:
///
/// - Respect an env var (e.g. `CONVOY_CONFIG`).
/// - Look for multiple default locations.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Convoy.toml")
}
