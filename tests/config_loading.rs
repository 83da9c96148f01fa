// tests/config_loading.rs

use std::error::Error;

use convoy::config::loader::{default_config_path, load_and_validate, load_from_path};
use convoy::errors::ConvoyError;

type TestResult = Result<(), Box<dyn Error>>;

const EXAMPLE_CONFIG: &str = r#"
[[process]]
handle = "build"

[process.spawn]
command = "make"
args = ["all"]

[[process]]
handle = "server"
waitOn = "build"
stdinPrefix = "srv"

[process.spawn]
command = "npm"
args = ["start"]
"#;

#[test]
fn loads_and_validates_a_config_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Convoy.toml");
    std::fs::write(&path, EXAMPLE_CONFIG)?;

    let cfg = load_and_validate(&path)?;

    let specs = cfg.processes();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].handle, "build");
    assert_eq!(specs[0].spawn.command, "make");
    assert_eq!(specs[0].spawn.args, vec!["all".to_string()]);
    assert_eq!(specs[1].wait_on.as_deref(), Some("build"));
    assert_eq!(specs[1].stdin_prefix.as_deref(), Some("srv"));

    Ok(())
}

#[test]
fn missing_config_file_is_a_discovery_failure() {
    let err = load_from_path("definitely/not/here/Convoy.toml")
        .expect_err("loading a missing file should fail");
    assert!(matches!(err, ConvoyError::ConfigDiscovery { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Convoy.toml");
    std::fs::write(&path, "[[process\nhandle=")?;

    let err = load_from_path(&path).expect_err("malformed TOML should fail");
    assert!(matches!(err, ConvoyError::Toml(_)));

    Ok(())
}

#[test]
fn entry_missing_its_spawn_table_fails_validation_not_parsing() -> TestResult {
    // The raw model is lenient: a missing spawn table deserializes to an
    // empty command, and validation reports it with the handle.
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Convoy.toml");
    std::fs::write(&path, "[[process]]\nhandle = \"web\"\n")?;

    let err = load_and_validate(&path).expect_err("missing command should fail validation");
    assert!(err.to_string().contains("no command"));

    Ok(())
}

#[test]
fn default_path_is_convoy_toml() {
    assert_eq!(default_config_path().to_string_lossy(), "Convoy.toml");
}
