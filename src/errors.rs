// src/errors.rs

//! Crate-wide error types and helpers.

use std::path::PathBuf;

use thiserror::Error;

/// A violation found while validating the declared process list.
///
/// Validation is fail-fast: the first violation in declaration order is
/// returned and nothing else is checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("entry {0} has no handle; handles are required")]
    MissingHandle(usize),

    #[error("'{0}' has already been used as a handle")]
    DuplicateHandle(String),

    #[error("'{0}' has no command; commands are required")]
    MissingCommand(String),

    #[error("'{handle}' waits on '{wait_on}' which does not exist prior to it")]
    DanglingWaitOn { handle: String, wait_on: String },

    #[error("'{0}' has already been used as a stdinPrefix")]
    DuplicatePrefix(String),
}

#[derive(Error, Debug)]
pub enum ConvoyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The config file could not be read at all. This is a pre-run discovery
    /// failure and maps to a distinguished exit status in `main`.
    #[error("could not read config file {path}: {source}")]
    ConfigDiscovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("environment preparation failed: {0}")]
    EnvPreparation(String),

    #[error("Command {command} for handle {handle} does not exist")]
    CommandNotFound { handle: String, command: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ConvoyError>;
