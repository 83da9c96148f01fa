use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use convoy::engine::{Handle, RuntimeEvent, SpawnRequest, StdChannel};
use convoy::errors::Result;
use convoy::exec::SpawnerBackend;

/// A fake spawner that:
/// - records which specs were dispatched (with their colors and indices)
/// - records every stdin write instead of delivering it
/// - when `auto_close` is set, immediately reports both stream closes for
///   each dispatched spec, simulating a process that runs and finishes at
///   once.
pub struct FakeSpawner {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    spawned: Arc<Mutex<Vec<SpawnRequest>>>,
    stdin_writes: Arc<Mutex<Vec<(Handle, Vec<u8>)>>>,
    auto_close: bool,
}

impl FakeSpawner {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        spawned: Arc<Mutex<Vec<SpawnRequest>>>,
        stdin_writes: Arc<Mutex<Vec<(Handle, Vec<u8>)>>>,
    ) -> Self {
        Self {
            runtime_tx,
            spawned,
            stdin_writes,
            auto_close: false,
        }
    }

    /// Make every dispatched spec "complete" immediately by emitting both
    /// of its stream-close events.
    pub fn with_auto_close(mut self) -> Self {
        self.auto_close = true;
        self
    }
}

impl SpawnerBackend for FakeSpawner {
    fn spawn_processes(
        &mut self,
        requests: Vec<SpawnRequest>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let spawned = Arc::clone(&self.spawned);
        let auto_close = self.auto_close;

        Box::pin(async move {
            for request in requests {
                let handle = request.spec.handle.clone();
                {
                    let mut guard = spawned.lock().unwrap();
                    guard.push(request);
                }

                if auto_close {
                    for channel in [StdChannel::Out, StdChannel::Err] {
                        tx.send(RuntimeEvent::StreamClosed {
                            handle: handle.clone(),
                            channel,
                        })
                        .await
                        .map_err(anyhow::Error::from)?;
                    }
                }
            }
            Ok(())
        })
    }

    fn write_stdin(
        &mut self,
        handle: Handle,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let stdin_writes = Arc::clone(&self.stdin_writes);

        Box::pin(async move {
            let mut guard = stdin_writes.lock().unwrap();
            guard.push((handle, bytes));
            Ok(())
        })
    }
}
