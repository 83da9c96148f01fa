// src/env.rs

//! Environment-file sourcing.
//!
//! Given an optional env file path, the file is sourced through the host
//! shell and the resulting environment captured via `printenv`. The captured
//! pairs are later applied to every child process's environment; the host
//! process environment is not mutated.
//!
//! Any failure here is fatal to the whole run and happens strictly before
//! any process is spawned; a partially parsed environment is never applied.

use std::path::Path;

use anyhow::Context;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{ConvoyError, Result};

/// Captured `KEY=VALUE` pairs, in the order `printenv` reported them.
pub type EnvMap = Vec<(String, String)>;

/// Source the given env file (if any) and capture the resulting environment.
///
/// The file is sourced with its own directory as the working directory, so
/// relative references inside it resolve next to the file.
pub async fn prepare_env(path: Option<&Path>) -> Result<EnvMap> {
    let Some(path) = path else {
        // No env file specified; nothing to prepare.
        return Ok(Vec::new());
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    info!(env_file = %path.display(), "sourcing environment file");

    let output = Command::new("sh")
        .arg("-c")
        .arg(r#". "$0" && printenv"#)
        .arg(path)
        .current_dir(dir)
        .output()
        .await
        .with_context(|| format!("sourcing env file {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvoyError::EnvPreparation(format!(
            "sourcing {} failed: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_env_output(&stdout))
}

/// Parse `printenv` output into pairs.
///
/// Each line is split on the first `=`. Lines without a `=` are tolerated
/// and skipped: the key has no defined value, so nothing is recorded for it.
pub fn parse_env_output(stdout: &str) -> EnvMap {
    let mut pairs = Vec::new();

    for line in stdout.lines() {
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => pairs.push((key.to_string(), value.to_string())),
            None => {
                debug!(line, "env line without '='; skipping");
            }
        }
    }

    pairs
}
