// tests/env_parsing.rs

//! Environment-file sourcing and `printenv` output parsing.

use std::error::Error;

use convoy::env::{parse_env_output, prepare_env};
use convoy::errors::ConvoyError;
use convoy_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn parses_key_value_lines() {
    let pairs = parse_env_output("FOO=bar\nBAZ=qux\n");
    assert_eq!(
        pairs,
        vec![
            ("FOO".to_string(), "bar".to_string()),
            ("BAZ".to_string(), "qux".to_string()),
        ]
    );
}

#[test]
fn splits_on_the_first_equals_only() {
    let pairs = parse_env_output("URL=postgres://db?opt=1\n");
    assert_eq!(
        pairs,
        vec![("URL".to_string(), "postgres://db?opt=1".to_string())]
    );
}

#[test]
fn tolerates_lines_without_equals() {
    // A line without '=' has no defined value; nothing is recorded for it
    // and the surrounding pairs are unaffected.
    let pairs = parse_env_output("FOO=bar\nnoise\nBAZ=qux\n");
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0, "FOO");
    assert_eq!(pairs[1].0, "BAZ");
}

#[test]
fn empty_values_are_kept() {
    let pairs = parse_env_output("EMPTY=\n");
    assert_eq!(pairs, vec![("EMPTY".to_string(), String::new())]);
}

#[tokio::test]
async fn no_env_file_means_no_pairs() -> TestResult {
    init_tracing();

    let pairs = prepare_env(None).await?;
    assert!(pairs.is_empty());

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn sources_an_env_file_through_the_shell() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("dev.env");
    std::fs::write(&path, "export CONVOY_SOURCED_VAR=from-file\n")?;

    let pairs = prepare_env(Some(&path)).await?;

    let found = pairs
        .iter()
        .find(|(key, _)| key == "CONVOY_SOURCED_VAR")
        .expect("sourced variable should be captured");
    assert_eq!(found.1, "from-file");

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn unreadable_env_file_is_fatal() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing.env");

    let err = prepare_env(Some(&path))
        .await
        .expect_err("sourcing a missing file should fail");
    assert!(matches!(err, ConvoyError::EnvPreparation(_)));

    Ok(())
}
