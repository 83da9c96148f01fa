// src/engine/runtime.rs

use std::fmt;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::errors::Result;
use crate::exec::SpawnerBackend;

use super::core::CoreSupervisor;
use super::{CoreCommand, RuntimeEvent, StdChannel};

/// Drives the core supervisor in response to `RuntimeEvent`s, and delegates
/// actual process spawning and stdin writes to a `SpawnerBackend`.
///
/// This is a pure IO shell around `CoreSupervisor`, which contains all the
/// orchestration semantics. This struct handles async IO: reading events
/// from the channel, writing decorated output to the host streams, and
/// dispatching spawns.
pub struct Runtime<S: SpawnerBackend> {
    core: CoreSupervisor,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    spawner: S,
}

impl<S: SpawnerBackend> fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<S: SpawnerBackend> Runtime<S> {
    pub fn new(core: CoreSupervisor, event_rx: mpsc::Receiver<RuntimeEvent>, spawner: S) -> Self {
        Self {
            core,
            event_rx,
            spawner,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`, one at a time. All
    ///   supervisor state mutation happens here, which is the entire
    ///   synchronization story: single writer, sequenced events.
    /// - Feeds each event into the pure core and executes the commands it
    ///   returns, in order.
    pub async fn run(mut self) -> Result<()> {
        info!("convoy runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            trace!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchSpawns(requests) => {
                let handles: Vec<_> = requests.iter().map(|r| r.spec.handle.as_str()).collect();
                debug!(?handles, "dispatching spawn requests");
                self.spawner.spawn_processes(requests).await?;
            }
            CoreCommand::WriteOutput { channel, text } => {
                self.write_host(channel, &text).await?;
            }
            CoreCommand::ForwardInput { handle, bytes } => {
                // A write error here means the target already exited; it
                // must not take the run down with it.
                if let Err(e) = self.spawner.write_stdin(handle.clone(), bytes).await {
                    warn!(handle = %handle, error = %e, "failed to forward input to process stdin");
                }
            }
            CoreCommand::ReportDiagnostic { message } => {
                self.write_host(StdChannel::Err, &format!("{message}\n")).await?;
            }
        }
        Ok(())
    }

    /// Write a decorated chunk to the host's matching stream.
    ///
    /// Flushed immediately: chunks are raw passthrough and frequently do not
    /// end in a newline.
    async fn write_host(&mut self, channel: StdChannel, text: &str) -> Result<()> {
        match channel {
            StdChannel::Out => {
                let mut out = tokio::io::stdout();
                out.write_all(text.as_bytes()).await?;
                out.flush().await?;
            }
            StdChannel::Err => {
                let mut err = tokio::io::stderr();
                err.write_all(text.as_bytes()).await?;
                err.flush().await?;
            }
        }
        Ok(())
    }
}
