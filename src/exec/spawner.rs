// src/exec/spawner.rs

//! Real process spawning: the command-existence probe, the launch itself,
//! and the stream pumps that feed output back into the runtime.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{Handle, RuntimeEvent, SpawnRequest, StdChannel};
use crate::env::EnvMap;
use crate::errors::ConvoyError;

use super::backend::StdinRegistry;

const PUMP_BUF_SIZE: usize = 8 * 1024;

/// Run one spawn branch to the point where the child is up and its streams
/// are pumping.
///
/// The branch probes whether the command is invocable, launches it with the
/// captured environment pairs applied, registers its stdin for input
/// forwarding, and attaches a pump task to each output stream. Any failure
/// before the process exists is reported as a `SpawnFailed` event and is
/// isolated to this branch.
pub(crate) async fn spawn_process_branch(
    request: SpawnRequest,
    env: Arc<EnvMap>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    stdin_registry: StdinRegistry,
) {
    let spec = request.spec;
    let handle = spec.handle.clone();

    match command_exists(&spec.spawn.command).await {
        Ok(true) => {}
        Ok(false) => {
            let message = ConvoyError::CommandNotFound {
                handle: handle.clone(),
                command: spec.spawn.command.clone(),
            }
            .to_string();
            report_spawn_failure(&runtime_tx, handle, message).await;
            return;
        }
        Err(e) => {
            let message = format!("probing command '{}': {}", spec.spawn.command, e);
            report_spawn_failure(&runtime_tx, handle, message).await;
            return;
        }
    }

    info!(
        handle = %handle,
        command = %spec.spawn.command,
        spawn_index = request.index,
        "starting process"
    );

    let mut child = match Command::new(&spec.spawn.command)
        .args(&spec.spawn.args)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            let message = format!("spawning '{}': {}", spec.spawn.command, e);
            report_spawn_failure(&runtime_tx, handle, message).await;
            return;
        }
    };

    if let Some(stdin) = child.stdin.take() {
        stdin_registry.lock().await.insert(handle.clone(), stdin);
    }

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(pump_stream(
            handle.clone(),
            StdChannel::Out,
            stdout,
            runtime_tx.clone(),
        ));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(pump_stream(
            handle.clone(),
            StdChannel::Err,
            stderr,
            runtime_tx.clone(),
        ));
    }

    // Reap the child so it doesn't linger as a zombie. Completion semantics
    // are driven by the stream-close events, not by the exit status.
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                info!(
                    handle = %handle,
                    exit_code = status.code().unwrap_or(-1),
                    success = status.success(),
                    "process exited"
                );
            }
            Err(e) => {
                warn!(handle = %handle, error = %e, "failed waiting for process");
            }
        }
    });
}

/// Check that a command is invocable on the host, through the shell.
async fn command_exists(command: &str) -> std::io::Result<bool> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(r#"command -v "$0" >/dev/null 2>&1"#)
        .arg(command)
        .status()
        .await?;
    Ok(status.success())
}

/// Read raw chunks from one child stream and forward them to the runtime,
/// in delivery order, with no coalescing across chunks. Sends the stream's
/// close signal when the stream ends.
async fn pump_stream<R>(
    handle: Handle,
    channel: StdChannel,
    mut stream: R,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; PUMP_BUF_SIZE];

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let event = RuntimeEvent::StreamChunk {
                    handle: handle.clone(),
                    channel,
                    bytes: buf[..n].to_vec(),
                };
                if runtime_tx.send(event).await.is_err() {
                    // Runtime is gone; nothing left to relay to.
                    return;
                }
            }
            Err(e) => {
                warn!(handle = %handle, ?channel, error = %e, "error reading child stream");
                break;
            }
        }
    }

    debug!(handle = %handle, ?channel, "child stream closed");
    let _ = runtime_tx
        .send(RuntimeEvent::StreamClosed { handle, channel })
        .await;
}

async fn report_spawn_failure(
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    handle: Handle,
    message: String,
) {
    warn!(handle = %handle, message = %message, "spawn branch failed");
    let _ = runtime_tx
        .send(RuntimeEvent::SpawnFailed { handle, message })
        .await;
}
