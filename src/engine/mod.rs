// src/engine/mod.rs

//! Orchestration engine for convoy.
//!
//! This module ties together:
//! - the process supervisor (spawn partitioning, the completion set, the
//!   handle table, dependency-triggered spawning)
//! - output relaying with per-process decoration
//! - input routing by stdin prefix
//! - the main runtime event loop that reacts to:
//!   - child stream chunks and stream closes
//!   - host stdin chunks
//!   - spawn failures
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::config::ProcessSpec;
use crate::relay::Color;

/// Canonical process handle type used throughout the engine.
pub type Handle = String;

/// Which of the two standard output channels a chunk or close event refers
/// to. Child stdout is relayed to host stdout, child stderr to host stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdChannel {
    Out,
    Err,
}

/// Events flowing into the runtime from stream pumps, the stdin listener,
/// spawn branches, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Environment preparation finished successfully; spawn all entries with
    /// no `waitOn` dependency.
    EnvReady,
    /// A chunk of bytes arrived on one of a child's output streams.
    StreamChunk {
        handle: Handle,
        channel: StdChannel,
        bytes: Vec<u8>,
    },
    /// One of a child's output streams closed. Stdout close and stderr close
    /// arrive as distinct events for the same logical completion; the core
    /// records the completion exactly once.
    StreamClosed { handle: Handle, channel: StdChannel },
    /// A spawn branch failed before the process existed (command probe or
    /// spawn error). Isolated to that branch.
    SpawnFailed { handle: Handle, message: String },
    /// A chunk of host input to route by stdin prefix.
    StdinChunk { bytes: Vec<u8> },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Description of a spawn the supervisor wants the spawner backend to
/// perform now.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub spec: ProcessSpec,
    /// Decoration color assigned from the spawn-order index.
    pub color: Color,
    /// Position in overall spawn order (immediate specs first, in
    /// declaration order, then dependency-triggered spawns as they fire).
    pub index: usize,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::{CompletionSet, CoreSupervisor};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
