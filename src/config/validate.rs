// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ConfigError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ConvoyError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_process_list(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.process))
    }
}

/// Check the declared process list in declaration order, fail-fast.
///
/// A running set of seen handles and seen stdin prefixes is maintained; each
/// entry is checked against the sets *before* being added, which is what
/// makes forward `waitOn` references invalid even when the name is declared
/// later.
fn validate_process_list(raw: &RawConfigFile) -> Result<()> {
    let mut handles: HashSet<&str> = HashSet::new();
    let mut prefixes: HashSet<&str> = HashSet::new();

    for (index, spec) in raw.process.iter().enumerate() {
        if spec.handle.is_empty() {
            return Err(ConfigError::MissingHandle(index).into());
        }

        if handles.contains(spec.handle.as_str()) {
            return Err(ConfigError::DuplicateHandle(spec.handle.clone()).into());
        }

        if spec.spawn.command.is_empty() {
            return Err(ConfigError::MissingCommand(spec.handle.clone()).into());
        }

        if let Some(wait_on) = spec.wait_on.as_deref() {
            if !handles.contains(wait_on) {
                return Err(ConfigError::DanglingWaitOn {
                    handle: spec.handle.clone(),
                    wait_on: wait_on.to_string(),
                }
                .into());
            }
        }

        if let Some(prefix) = spec.stdin_prefix.as_deref() {
            if prefixes.contains(prefix) {
                return Err(ConfigError::DuplicatePrefix(prefix.to_string()).into());
            }
            prefixes.insert(prefix);
        }

        handles.insert(spec.handle.as_str());
    }

    Ok(())
}
