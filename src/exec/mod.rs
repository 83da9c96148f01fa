// src/exec/mod.rs

//! Process spawning layer.
//!
//! This module is responsible for actually launching the commands declared
//! in the process list, using `tokio::process::Command`, and reporting back
//! to the orchestration runtime via `RuntimeEvent`s.
//!
//! - [`backend`] provides the `SpawnerBackend` trait and a concrete
//!   `RealSpawnerBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.
//! - [`spawner`] holds the real spawning path: the command-existence probe,
//!   the spawn itself, and the stream pump tasks that feed chunks and close
//!   signals into the runtime.

pub mod backend;
pub mod spawner;

pub use backend::{RealSpawnerBackend, SpawnerBackend};
