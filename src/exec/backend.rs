// src/exec/backend.rs

//! Pluggable spawner backend abstraction.
//!
//! The runtime talks to a `SpawnerBackend` instead of spawning processes
//! directly. This makes it easy to swap in a fake spawner in tests while
//! keeping the production implementation in [`spawner`].
//!
//! - `RealSpawnerBackend` is the default implementation used by `convoy`.
//!   It launches each spawn request as its own branch and keeps the child
//!   stdin registry used for input forwarding.
//! - Tests can provide their own `SpawnerBackend` that, for example, records
//!   which specs were dispatched and directly emits `StreamClosed` events.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::engine::{Handle, RuntimeEvent, SpawnRequest};
use crate::env::EnvMap;
use crate::errors::Result;

use super::spawner::spawn_process_branch;

/// Registry of live child stdin handles, keyed by process handle.
///
/// Written by spawn branches as children come up; read by input forwarding.
pub(crate) type StdinRegistry = Arc<Mutex<HashMap<Handle, ChildStdin>>>;

/// Trait abstracting how spawn requests are executed and how input reaches
/// a child's stdin.
///
/// Production code uses [`RealSpawnerBackend`]; tests can provide their own
/// implementation that doesn't launch real processes.
pub trait SpawnerBackend: Send {
    /// Launch the given spawn requests.
    ///
    /// The implementation is free to:
    /// - probe and spawn OS processes (production)
    /// - record the requests and synthesize close events (tests)
    ///
    /// Each request is an independent branch: a failure in one must not
    /// prevent or delay the others.
    fn spawn_processes(
        &mut self,
        requests: Vec<SpawnRequest>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Write the given bytes to the named process's stdin.
    ///
    /// Delivery is at-most-once and immediate. An error return means the
    /// write failed (e.g. the process exited); the caller reports it and
    /// carries on.
    fn write_stdin(
        &mut self,
        handle: Handle,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real spawner backend used in production.
///
/// Each spawn request is launched in its own Tokio task so that slow
/// command probes or failing branches never hold up siblings. The captured
/// environment-file pairs are applied to every child at spawn time.
pub struct RealSpawnerBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    env: Arc<EnvMap>,
    stdin_registry: StdinRegistry,
}

impl RealSpawnerBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, env: EnvMap) -> Self {
        Self {
            runtime_tx,
            env: Arc::new(env),
            stdin_registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl SpawnerBackend for RealSpawnerBackend {
    fn spawn_processes(
        &mut self,
        requests: Vec<SpawnRequest>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the shared state so the future doesn't borrow `self` across
        // `await`.
        let tx = self.runtime_tx.clone();
        let env = Arc::clone(&self.env);
        let registry = Arc::clone(&self.stdin_registry);

        Box::pin(async move {
            for request in requests {
                let tx = tx.clone();
                let env = Arc::clone(&env);
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    spawn_process_branch(request, env, tx, registry).await;
                });
            }
            Ok(())
        })
    }

    fn write_stdin(
        &mut self,
        handle: Handle,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let registry = Arc::clone(&self.stdin_registry);

        Box::pin(async move {
            let mut registry = registry.lock().await;

            let write_result = match registry.get_mut(&handle) {
                Some(stdin) => match stdin.write_all(&bytes).await {
                    Ok(()) => stdin.flush().await,
                    Err(e) => Err(e),
                },
                None => {
                    debug!(handle = %handle, "no live stdin for handle; dropping input");
                    return Ok(());
                }
            };

            if let Err(e) = write_result {
                // The child is gone; forget its stdin so later chunks fall
                // through to the quiet path.
                registry.remove(&handle);
                return Err(e.into());
            }

            Ok(())
        })
    }
}
