// tests/input_routing.rs

//! Input demultiplexing: prefix matching and forwarding through the core.

use convoy::engine::{CoreCommand, CoreSupervisor, RuntimeEvent};
use convoy::relay::Palette;
use convoy::router::route_input;
use convoy_test_utils::builders::{ConfigFileBuilder, ProcessSpecBuilder};
use convoy_test_utils::init_tracing;

fn stdin(chunk: &str) -> RuntimeEvent {
    RuntimeEvent::StdinChunk {
        bytes: chunk.as_bytes().to_vec(),
    }
}

#[test]
fn matching_chunk_is_stripped_and_forwarded() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("web", "npm").stdin_prefix("foo").build())
        .build();
    let mut core = CoreSupervisor::new(cfg, Palette::new(false));

    core.step(RuntimeEvent::EnvReady);
    let step = core.step(stdin("foo.bar\n"));

    assert!(matches!(
        &step.commands[..],
        [CoreCommand::ForwardInput { handle, bytes }]
            if handle == "web" && bytes == b"bar\n"
    ));
}

#[test]
fn unmatched_chunk_is_dropped_with_a_diagnostic() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("web", "npm").stdin_prefix("foo").build())
        .build();
    let mut core = CoreSupervisor::new(cfg, Palette::new(false));

    core.step(RuntimeEvent::EnvReady);
    let step = core.step(stdin("quux.hello\n"));

    assert!(matches!(
        &step.commands[..],
        [CoreCommand::ReportDiagnostic { message }] if message == "No target for input"
    ));
}

#[test]
fn prefix_without_separator_does_not_match() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("web", "npm").stdin_prefix("foo").build())
        .build();
    let mut core = CoreSupervisor::new(cfg, Palette::new(false));

    core.step(RuntimeEvent::EnvReady);
    // Starts with the prefix, but the separator is missing.
    let step = core.step(stdin("foobar\n"));

    assert!(matches!(
        &step.commands[..],
        [CoreCommand::ReportDiagnostic { .. }]
    ));
}

#[test]
fn chunk_for_a_not_yet_spawned_target_is_dropped_quietly() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("a", "echo a").build())
        .with_process(
            ProcessSpecBuilder::new("b", "echo b")
                .wait_on("a")
                .stdin_prefix("b")
                .build(),
        )
        .build();
    let mut core = CoreSupervisor::new(cfg, Palette::new(false));

    core.step(RuntimeEvent::EnvReady);
    assert!(!core.is_spawned("b"));

    // The prefix matches, so this is not a routing miss; but the target has
    // not been spawned, so nothing is forwarded either.
    let step = core.step(stdin("b.hello\n"));
    assert!(step.commands.is_empty());
}

#[test]
fn route_input_scans_in_declaration_order_with_first_match_winning() {
    let specs = vec![
        ProcessSpecBuilder::new("one", "echo 1").stdin_prefix("s").build(),
        ProcessSpecBuilder::new("two", "echo 2").stdin_prefix("srv").build(),
    ];

    // "s.x" hits the first spec.
    let (spec, rest) = route_input(&specs, "s.x").expect("should match");
    assert_eq!(spec.handle, "one");
    assert_eq!(rest, "x");

    // "srv.x" starts with "s" but the next character is not the separator,
    // so the scan moves on and the second spec matches.
    let (spec, rest) = route_input(&specs, "srv.x").expect("should match");
    assert_eq!(spec.handle, "two");
    assert_eq!(rest, "x");
}

#[test]
fn route_input_skips_specs_without_a_prefix() {
    let specs = vec![
        ProcessSpecBuilder::new("quiet", "echo q").build(),
        ProcessSpecBuilder::new("loud", "echo l").stdin_prefix("go").build(),
    ];

    let (spec, rest) = route_input(&specs, "go.now\n").expect("should match");
    assert_eq!(spec.handle, "loud");
    assert_eq!(rest, "now\n");

    assert!(route_input(&specs, "stop.now\n").is_none());
}

#[test]
fn forwarded_remainder_is_passed_through_unmodified() {
    let specs =
        vec![ProcessSpecBuilder::new("web", "npm").stdin_prefix("w").build()];

    // Everything after the separator is forwarded as-is, separators
    // included.
    let (_, rest) = route_input(&specs, "w.a.b.c\n").expect("should match");
    assert_eq!(rest, "a.b.c\n");

    // An empty remainder is still a match.
    let (_, rest) = route_input(&specs, "w.").expect("should match");
    assert_eq!(rest, "");
}
