// src/router.rs

//! Input demultiplexing: deciding which process a chunk of host input is
//! meant for, and the listener task that feeds host stdin into the runtime.
//!
//! Inputs are prefixed with the target's configured `stdinPrefix` followed
//! by a literal `.`; everything after the separator is forwarded unmodified.

use std::io::Read;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ProcessSpec;
use crate::engine::RuntimeEvent;

/// Find the process an input chunk is addressed to.
///
/// Specs are scanned in declaration order; a spec matches if the chunk
/// begins with its `stdinPrefix` followed immediately by a single `.`.
/// First match wins. Returns the matched spec and the remainder of the
/// chunk with the prefix and separator stripped.
pub fn route_input<'a>(specs: &'a [ProcessSpec], input: &'a str) -> Option<(&'a ProcessSpec, &'a str)> {
    specs.iter().find_map(|spec| {
        let prefix = spec.stdin_prefix.as_deref()?;
        let rest = input.strip_prefix(prefix)?;
        let rest = rest.strip_prefix('.')?;
        Some((spec, rest))
    })
}

/// Spawn the host stdin listener.
///
/// Reads raw chunks from the host's stdin on a dedicated thread and
/// forwards each one as a [`RuntimeEvent::StdinChunk`]. A plain thread
/// rather than an async read: a pending blocking-pool stdin read would keep
/// the runtime from shutting down, while a detached thread just dies with
/// the process.
pub fn spawn_stdin_listener(tx: mpsc::Sender<RuntimeEvent>) {
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut buf = [0u8; 1024];

        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let chunk = buf[..n].to_vec();
                    if tx.blocking_send(RuntimeEvent::StdinChunk { bytes: chunk }).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to read host stdin");
                    break;
                }
            }
        }

        debug!("host stdin closed");
    });
}
