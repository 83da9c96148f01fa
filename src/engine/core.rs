// src/engine/core.rs

//! Pure core supervisor state machine.
//!
//! This module contains a synchronous, deterministic "core supervisor" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing `SpawnRequest`s to the spawner backend
//! - writing decorated output to the host streams
//! - handling Ctrl+C / shutdown
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, or processes.

use std::collections::{HashMap, HashSet};

use crate::config::ConfigFile;
use crate::engine::event_handlers::{
    handle_env_ready, handle_spawn_failed, handle_stdin_chunk, handle_stream_chunk,
    handle_stream_closed, CoreStep,
};
use crate::engine::{Handle, RuntimeEvent, SpawnRequest};
use crate::relay::{Color, Palette};

/// Append-only record of handles whose completion has been observed.
///
/// Owned by one [`CoreSupervisor`] instance and scoped to one orchestration
/// run; never shared across runs. A handle is added at most once even though
/// its process emits two independent stream-close signals.
#[derive(Debug, Default)]
pub struct CompletionSet {
    handles: HashSet<Handle>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completion. Returns `true` only the first time a handle is
    /// recorded; subsequent calls for the same handle are no-ops.
    pub fn record(&mut self, handle: &str) -> bool {
        self.handles.insert(handle.to_string())
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.handles.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Core-side record of a process that has been dispatched for spawning.
///
/// The OS-level state (child stdin, stream pumps) lives in the spawner
/// backend; this record carries what the supervisor itself needs: which spec
/// the process came from, its decoration color, and whether its completion
/// has been handled.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedProcess {
    pub spec_index: usize,
    pub color: Color,
    pub completed: bool,
}

/// Pure core supervisor state.
///
/// This owns:
/// - the validated process list, in declaration order
/// - the handle table of dispatched processes (persists for the whole run,
///   since late dependency triggers and input routing must find any
///   previously spawned entry at any time)
/// - the completion set
/// - the decoration palette
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreSupervisor {
    specs: Vec<crate::config::ProcessSpec>,
    table: HashMap<Handle, SpawnedProcess>,
    completed: CompletionSet,
    palette: Palette,
}

impl CoreSupervisor {
    pub fn new(config: ConfigFile, palette: Palette) -> Self {
        Self {
            specs: config.into_processes(),
            table: HashMap::new(),
            completed: CompletionSet::new(),
            palette,
        }
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::EnvReady => handle_env_ready(self),
            RuntimeEvent::StreamChunk {
                handle,
                channel,
                bytes,
            } => handle_stream_chunk(self, handle, channel, bytes),
            RuntimeEvent::StreamClosed { handle, channel } => {
                handle_stream_closed(self, handle, channel)
            }
            RuntimeEvent::SpawnFailed { handle, message } => {
                handle_spawn_failed(self, handle, message)
            }
            RuntimeEvent::StdinChunk { bytes } => handle_stdin_chunk(self, bytes),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// The declared specs, in declaration order.
    pub fn specs(&self) -> &[crate::config::ProcessSpec] {
        &self.specs
    }

    /// Look up a dispatched process by handle.
    pub fn process(&self, handle: &str) -> Option<&SpawnedProcess> {
        self.table.get(handle)
    }

    /// Whether the given handle has been dispatched for spawning.
    pub fn is_spawned(&self, handle: &str) -> bool {
        self.table.contains_key(handle)
    }

    /// Whether the given handle's completion has been recorded.
    pub fn is_completed(&self, handle: &str) -> bool {
        self.completed.contains(handle)
    }

    /// Number of processes dispatched so far.
    pub fn spawned_count(&self) -> usize {
        self.table.len()
    }

    pub(crate) fn palette(&self) -> Palette {
        self.palette
    }

    /// Create the table entry for a spec and build its spawn request.
    ///
    /// The spawn-order index is the table size at dispatch time, so color
    /// assignment stays a pure function of that index.
    pub(crate) fn dispatch_spawn(&mut self, spec_index: usize) -> SpawnRequest {
        let spec = self.specs[spec_index].clone();
        let index = self.table.len();
        let color = self.palette.color_for_index(index);

        self.table.insert(
            spec.handle.clone(),
            SpawnedProcess {
                spec_index,
                color,
                completed: false,
            },
        );

        SpawnRequest { spec, color, index }
    }

    /// Record a completion in the completion set. Returns `false` when the
    /// handle was already recorded (the duplicate close signal case).
    pub(crate) fn record_completion(&mut self, handle: &str) -> bool {
        self.completed.record(handle)
    }

    /// Flag a dispatched process as completed and return its color.
    pub(crate) fn mark_completed(&mut self, handle: &str) -> Option<Color> {
        let proc = self.table.get_mut(handle)?;
        proc.completed = true;
        Some(proc.color)
    }

    /// Drop the table entry for a handle whose spawn branch failed; the
    /// process never existed.
    pub(crate) fn remove_process(&mut self, handle: &str) {
        self.table.remove(handle);
    }
}
