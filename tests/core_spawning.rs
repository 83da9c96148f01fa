// tests/core_spawning.rs

//! Core-level spawning semantics: immediate spawns, dependency-deferred
//! spawns, completion idempotence, and spawn-failure isolation. These run
//! against the pure supervisor core, without Tokio or processes.

use convoy::engine::{CoreCommand, CoreStep, CoreSupervisor, RuntimeEvent, StdChannel};
use convoy::relay::Palette;
use convoy_test_utils::builders::{ConfigFileBuilder, ProcessSpecBuilder};
use convoy_test_utils::init_tracing;

fn supervisor(cfg: convoy::config::ConfigFile) -> CoreSupervisor {
    CoreSupervisor::new(cfg, Palette::new(false))
}

fn dispatched_handles(step: &CoreStep) -> Vec<String> {
    step.commands
        .iter()
        .filter_map(|cmd| match cmd {
            CoreCommand::DispatchSpawns(requests) => {
                Some(requests.iter().map(|r| r.spec.handle.clone()))
            }
            _ => None,
        })
        .flatten()
        .collect()
}

fn banner_count(step: &CoreStep, handle: &str) -> usize {
    let needle = format!("{handle}: completed");
    step.commands
        .iter()
        .filter(|cmd| matches!(
            cmd,
            CoreCommand::WriteOutput { text, .. } if text.contains(&needle)
        ))
        .count()
}

fn close(handle: &str, channel: StdChannel) -> RuntimeEvent {
    RuntimeEvent::StreamClosed {
        handle: handle.to_string(),
        channel,
    }
}

#[test]
fn env_ready_spawns_all_dependency_free_entries_in_declaration_order() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("a", "echo a").build())
        .with_process(ProcessSpecBuilder::new("b", "echo b").build())
        .with_process(ProcessSpecBuilder::new("c", "echo c").wait_on("a").build())
        .build();
    let mut core = supervisor(cfg);

    let step = core.step(RuntimeEvent::EnvReady);

    assert_eq!(dispatched_handles(&step), vec!["a", "b"]);
    assert!(core.is_spawned("a"));
    assert!(core.is_spawned("b"));
    assert!(!core.is_spawned("c"));
}

#[test]
fn colors_follow_spawn_order_and_cycle_through_the_palette() {
    init_tracing();

    let palette = Palette::new(true);
    let mut builder = ConfigFileBuilder::new();
    for i in 0..8 {
        let handle = format!("p{i}");
        builder = builder.with_process(ProcessSpecBuilder::new(&handle, "echo hi").build());
    }
    let mut core = CoreSupervisor::new(builder.build(), palette);

    let step = core.step(RuntimeEvent::EnvReady);

    let requests = match &step.commands[0] {
        CoreCommand::DispatchSpawns(requests) => requests,
        other => panic!("expected a dispatch command, got {other:?}"),
    };

    for (i, request) in requests.iter().enumerate() {
        assert_eq!(request.index, i);
        assert_eq!(request.color, palette.color_for_index(i));
    }
    // The palette has six entries, so the seventh spawn reuses the first
    // color.
    assert_eq!(requests[6].color, requests[0].color);
}

#[test]
fn deferred_entry_spawns_only_after_its_dependency_completes() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("a", "echo a").build())
        .with_process(ProcessSpecBuilder::new("b", "echo b").wait_on("a").build())
        .build();
    let mut core = supervisor(cfg);

    let step = core.step(RuntimeEvent::EnvReady);
    assert_eq!(dispatched_handles(&step), vec!["a"]);
    assert!(!core.is_spawned("b"));

    let step = core.step(close("a", StdChannel::Out));
    assert_eq!(dispatched_handles(&step), vec!["b"]);
    assert!(core.is_completed("a"));
    assert_eq!(banner_count(&step, "a"), 1);
}

#[test]
fn double_close_records_completion_and_spawns_dependents_exactly_once() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("a", "echo a").build())
        .with_process(ProcessSpecBuilder::new("b", "echo b").wait_on("a").build())
        .build();
    let mut core = supervisor(cfg);

    core.step(RuntimeEvent::EnvReady);

    // Stdout and stderr close independently for the same logical
    // completion.
    let first = core.step(close("a", StdChannel::Out));
    let second = core.step(close("a", StdChannel::Err));

    assert_eq!(dispatched_handles(&first), vec!["b"]);
    assert_eq!(banner_count(&first, "a"), 1);

    assert!(dispatched_handles(&second).is_empty());
    assert_eq!(banner_count(&second, "a"), 0);
    assert!(second.commands.is_empty());
}

#[test]
fn completion_triggering_is_transitive_along_a_chain() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("a", "echo a").build())
        .with_process(ProcessSpecBuilder::new("b", "echo b").wait_on("a").build())
        .with_process(ProcessSpecBuilder::new("c", "echo c").wait_on("b").build())
        .build();
    let mut core = supervisor(cfg);

    let step = core.step(RuntimeEvent::EnvReady);
    assert_eq!(dispatched_handles(&step), vec!["a"]);

    let step = core.step(close("a", StdChannel::Out));
    assert_eq!(dispatched_handles(&step), vec!["b"]);
    assert!(!core.is_spawned("c"));

    let step = core.step(close("b", StdChannel::Out));
    assert_eq!(dispatched_handles(&step), vec!["c"]);
}

#[test]
fn two_entries_can_wait_on_the_same_handle() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("build", "make").build())
        .with_process(ProcessSpecBuilder::new("server", "npm").wait_on("build").build())
        .with_process(ProcessSpecBuilder::new("docs", "mkdocs").wait_on("build").build())
        .build();
    let mut core = supervisor(cfg);

    core.step(RuntimeEvent::EnvReady);
    let step = core.step(close("build", StdChannel::Err));

    assert_eq!(dispatched_handles(&step), vec!["server", "docs"]);
}

#[test]
fn spawn_failure_is_reported_and_scoped_to_its_branch() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("good", "echo ok").build())
        .with_process(ProcessSpecBuilder::new("bad", "no-such-cmd").build())
        .with_process(ProcessSpecBuilder::new("child", "echo c").wait_on("bad").build())
        .build();
    let mut core = supervisor(cfg);

    core.step(RuntimeEvent::EnvReady);
    assert!(core.is_spawned("good"));
    assert!(core.is_spawned("bad"));

    let message = "Command no-such-cmd for handle bad does not exist".to_string();
    let step = core.step(RuntimeEvent::SpawnFailed {
        handle: "bad".to_string(),
        message,
    });

    // The failure is reported and the failed branch's entry is dropped; the
    // sibling is untouched.
    assert!(matches!(
        &step.commands[..],
        [CoreCommand::ReportDiagnostic { message }] if message.contains("does not exist")
    ));
    assert!(!core.is_spawned("bad"));
    assert!(core.is_spawned("good"));

    // The dependent never spawns, since the triggering completion never
    // occurs.
    assert!(!core.is_spawned("child"));
    assert!(!core.is_completed("bad"));
}

#[test]
fn shutdown_stops_the_loop() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_process(ProcessSpecBuilder::new("a", "echo a").build())
        .build();
    let mut core = supervisor(cfg);

    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}
