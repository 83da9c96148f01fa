// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// The expected format is an ordered list of process entries:
///
/// ```toml
/// [[process]]
/// handle = "build"
///
/// [process.spawn]
/// command = "make"
/// args = ["watch"]
///
/// [[process]]
/// handle = "server"
/// waitOn = "build"
/// stdinPrefix = "srv"
///
/// [process.spawn]
/// command = "npm"
/// args = ["start"]
/// ```
///
/// `waitOn`, `stdinPrefix` and `spawn.args` are optional. Declaration order
/// is significant: `waitOn` may only reference handles declared earlier, and
/// stdin prefixes are matched in declaration order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// All `[[process]]` entries, in declaration order.
    #[serde(default)]
    pub process: Vec<ProcessSpec>,
}

/// One declared process entry.
///
/// Deserialization is deliberately lenient: a missing `handle` or `spawn`
/// section becomes an empty value so that validation, not serde, reports the
/// violation with the entry's position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessSpec {
    /// Unique identifier naming this entry.
    #[serde(default)]
    pub handle: String,

    /// What to execute.
    #[serde(default)]
    pub spawn: SpawnSpec,

    /// Defer this entry's spawn until the named handle's completion has been
    /// recorded. Must reference a handle declared strictly earlier.
    #[serde(default, rename = "waitOn")]
    pub wait_on: Option<String>,

    /// Token routing host input to this process: a chunk starting with
    /// `<stdinPrefix>.` is stripped of that lead-in and written to this
    /// process's stdin.
    #[serde(default, rename = "stdinPrefix")]
    pub stdin_prefix: Option<String>,
}

/// The `spawn` table of a process entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpawnSpec {
    /// Program to invoke. The command is executed directly, not through a
    /// shell.
    #[serde(default)]
    pub command: String,

    /// Arguments passed to the command, in order.
    #[serde(default)]
    pub args: Vec<String>,
}

/// A validated process list.
///
/// Can only be constructed through validation (see
/// `TryFrom<RawConfigFile>` in [`crate::config::validate`]), so holding a
/// `ConfigFile` means every invariant of the process list holds: handles
/// unique and non-empty, commands non-empty, `waitOn` references resolve
/// strictly earlier, stdin prefixes unique.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    processes: Vec<ProcessSpec>,
}

impl ConfigFile {
    /// Construct without validating. Only the validation gate should call
    /// this.
    pub(crate) fn new_unchecked(processes: Vec<ProcessSpec>) -> Self {
        Self { processes }
    }

    /// The declared entries, in declaration order.
    pub fn processes(&self) -> &[ProcessSpec] {
        &self.processes
    }

    pub fn into_processes(self) -> Vec<ProcessSpec> {
        self.processes
    }
}
