// src/engine/event_handlers.rs

//! Event handling logic for the core supervisor.

use tracing::{debug, warn};

use crate::engine::core::CoreSupervisor;
use crate::engine::{Handle, SpawnRequest, StdChannel};
use crate::relay;
use crate::router::route_input;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Hand these spawn requests to the spawner backend.
    DispatchSpawns(Vec<SpawnRequest>),
    /// Write already-decorated text to the given host stream.
    WriteOutput { channel: StdChannel, text: String },
    /// Write these bytes to the named process's stdin.
    ForwardInput { handle: Handle, bytes: Vec<u8> },
    /// Report an orchestrator diagnostic (already painted) on host stderr.
    ReportDiagnostic { message: String },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Environment preparation succeeded: spawn every entry with no `waitOn`.
///
/// Spawn order (and hence color assignment) follows declaration order among
/// the immediate specs; deferred specs spawn later, when their dependency's
/// completion is recorded.
pub fn handle_env_ready(core: &mut CoreSupervisor) -> CoreStep {
    // Decide first, then mutate to avoid borrowing issues.
    let immediate: Vec<usize> = core
        .specs()
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.wait_on.is_none())
        .map(|(index, _)| index)
        .collect();

    debug!(count = immediate.len(), "spawning immediate entries");

    let requests: Vec<SpawnRequest> = immediate
        .into_iter()
        .map(|index| core.dispatch_spawn(index))
        .collect();

    let mut commands = Vec::new();
    if !requests.is_empty() {
        commands.push(CoreCommand::DispatchSpawns(requests));
    }
    CoreStep::running(commands)
}

/// A chunk arrived on a child stream: decorate and relay it to the host's
/// matching stream.
pub fn handle_stream_chunk(
    core: &mut CoreSupervisor,
    handle: Handle,
    channel: StdChannel,
    bytes: Vec<u8>,
) -> CoreStep {
    let Some(proc) = core.process(&handle) else {
        warn!(handle = %handle, "stream chunk for unknown process; dropping");
        return CoreStep::running(Vec::new());
    };

    let text = String::from_utf8_lossy(&bytes);
    let decorated = relay::decorate_chunk(&handle, proc.color, &text);

    CoreStep::running(vec![CoreCommand::WriteOutput {
        channel,
        text: decorated,
    }])
}

/// A child stream closed: record the completion (once), announce it, and
/// spawn every deferred entry waiting on this handle.
///
/// Stdout close and stderr close fire independently for the same logical
/// completion; the completion-set check makes everything after it execute
/// exactly once per handle. Triggering is transitive: a spawn triggered
/// here can, on its own completion, trigger further dependents.
pub fn handle_stream_closed(
    core: &mut CoreSupervisor,
    handle: Handle,
    channel: StdChannel,
) -> CoreStep {
    debug!(handle = %handle, ?channel, "stream closed");

    if !core.record_completion(&handle) {
        // The other stream already closed; completion handled then.
        return CoreStep::running(Vec::new());
    }

    let color = core.mark_completed(&handle).unwrap_or(relay::Color::NONE);

    let mut commands = vec![CoreCommand::WriteOutput {
        channel: StdChannel::Out,
        text: relay::completion_banner(&handle, color),
    }];

    let waiting: Vec<usize> = core
        .specs()
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.wait_on.as_deref() == Some(handle.as_str()))
        .map(|(index, _)| index)
        .collect();

    if !waiting.is_empty() {
        debug!(
            handle = %handle,
            dependents = waiting.len(),
            "completion recorded; spawning dependents"
        );
        let requests: Vec<SpawnRequest> = waiting
            .into_iter()
            .map(|index| core.dispatch_spawn(index))
            .collect();
        commands.push(CoreCommand::DispatchSpawns(requests));
    }

    CoreStep::running(commands)
}

/// A spawn branch failed (command probe or spawn error). The failure is
/// reported and scoped to that branch: siblings and already-running
/// processes are unaffected, and the branch's dependents never spawn since
/// the triggering completion never occurs.
pub fn handle_spawn_failed(
    core: &mut CoreSupervisor,
    handle: Handle,
    message: String,
) -> CoreStep {
    core.remove_process(&handle);

    let painted = core.palette().paint_diagnostic(&format!("Error: {message}"));
    CoreStep::running(vec![CoreCommand::ReportDiagnostic { message: painted }])
}

/// A chunk of host input arrived: route it by stdin prefix.
///
/// First spec in declaration order whose `stdinPrefix` followed by `.`
/// starts the chunk wins; the remainder is forwarded unmodified. A chunk
/// matching no prefix is dropped with a diagnostic. A chunk matching a spec
/// that has not been spawned yet is dropped quietly; delivery is
/// at-most-once with no queuing.
pub fn handle_stdin_chunk(core: &mut CoreSupervisor, bytes: Vec<u8>) -> CoreStep {
    let text = String::from_utf8_lossy(&bytes).into_owned();

    let Some((spec, rest)) = route_input(core.specs(), &text) else {
        let painted = core.palette().paint_diagnostic("No target for input");
        return CoreStep::running(vec![CoreCommand::ReportDiagnostic { message: painted }]);
    };

    if !core.is_spawned(&spec.handle) {
        warn!(
            handle = %spec.handle,
            "input target has not been spawned yet; dropping chunk"
        );
        return CoreStep::running(Vec::new());
    }

    CoreStep::running(vec![CoreCommand::ForwardInput {
        handle: spec.handle.clone(),
        bytes: rest.as_bytes().to_vec(),
    }])
}
