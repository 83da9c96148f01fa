// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod relay;
pub mod router;

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::ConfigFile;
use crate::engine::{CoreSupervisor, Runtime, RuntimeEvent};
use crate::errors::Result;
use crate::exec::RealSpawnerBackend;
use crate::relay::Palette;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + validation
/// - environment-file sourcing (strictly before any spawn)
/// - core supervisor / runtime
/// - real spawner backend
/// - host stdin listener
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let palette = Palette::new(!args.no_color);

    // Environment preparation is fatal on failure and must finish before
    // any process exists.
    let env = env::prepare_env(args.env_file.as_deref().map(std::path::Path::new)).await?;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Process spawner backend (real implementation in production).
    let spawner = RealSpawnerBackend::new(rt_tx.clone(), env);

    // Host input router, running concurrently with everything else.
    router::spawn_stdin_listener(rt_tx.clone());

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Seed the spawn of all dependency-free entries.
    info!(
        processes = cfg.processes().len(),
        "configuration valid; starting orchestration"
    );
    rt_tx.send(RuntimeEvent::EnvReady).await.map_err(anyhow::Error::from)?;

    // Construct the pure core supervisor (single source of truth for
    // semantics) and the async IO shell around it.
    let core = CoreSupervisor::new(cfg, palette);
    let runtime = Runtime::new(core, rt_rx, spawner);
    runtime.run().await
}

/// Simple dry-run output: print handles, commands and routing setup.
fn print_dry_run(cfg: &ConfigFile) {
    println!("convoy dry-run");
    println!();

    println!("processes ({}):", cfg.processes().len());
    for spec in cfg.processes() {
        println!("  - {}", spec.handle);
        println!("      command: {}", spec.spawn.command);
        if !spec.spawn.args.is_empty() {
            println!("      args: {:?}", spec.spawn.args);
        }
        if let Some(ref wait_on) = spec.wait_on {
            println!("      waitOn: {wait_on}");
        }
        if let Some(ref prefix) = spec.stdin_prefix {
            println!("      stdinPrefix: {prefix}");
        }
    }

    debug!("dry-run complete (no spawning)");
}
