#![allow(dead_code)]

use convoy::config::{ConfigFile, ProcessSpec, RawConfigFile, SpawnSpec};

/// Builder for one `ProcessSpec` entry.
pub struct ProcessSpecBuilder {
    spec: ProcessSpec,
}

impl ProcessSpecBuilder {
    pub fn new(handle: &str, command: &str) -> Self {
        Self {
            spec: ProcessSpec {
                handle: handle.to_string(),
                spawn: SpawnSpec {
                    command: command.to_string(),
                    args: vec![],
                },
                wait_on: None,
                stdin_prefix: None,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.spec.spawn.args.push(arg.to_string());
        self
    }

    pub fn wait_on(mut self, handle: &str) -> Self {
        self.spec.wait_on = Some(handle.to_string());
        self
    }

    pub fn stdin_prefix(mut self, prefix: &str) -> Self {
        self.spec.stdin_prefix = Some(prefix.to_string());
        self
    }

    pub fn build(self) -> ProcessSpec {
        self.spec
    }
}

/// Builder for a whole config, preserving declaration order.
pub struct ConfigFileBuilder {
    raw: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawConfigFile { process: vec![] },
        }
    }

    pub fn with_process(mut self, spec: ProcessSpec) -> Self {
        self.raw.process.push(spec);
        self
    }

    /// Build the raw, unvalidated form — for tests exercising the validator
    /// itself.
    pub fn build_raw(self) -> RawConfigFile {
        self.raw
    }

    /// Build a validated config; panics if the assembled list is invalid.
    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
