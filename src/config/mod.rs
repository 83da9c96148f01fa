// src/config/mod.rs

//! Configuration: the declared process list.
//!
//! - [`model`] holds the serde models for the TOML config file.
//! - [`loader`] reads a config file from disk.
//! - [`validate`] is the validation gate between [`model::RawConfigFile`]
//!   and [`model::ConfigFile`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ProcessSpec, RawConfigFile, SpawnSpec};
