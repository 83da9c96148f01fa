// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `convoy`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "convoy",
    version,
    about = "Run a set of related commands as one unit, with dependency-deferred starts and stdin routing.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Convoy.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Convoy.toml")]
    pub config: String,

    /// Environment file to source through the shell before any process
    /// starts. The captured variables are applied to every child.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CONVOY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Disable colored output decoration and diagnostics.
    #[arg(long)]
    pub no_color: bool,

    /// Parse + validate, print the process list, but don't spawn anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
