// tests/orchestrator.rs

mod common;
use crate::common::{init_tracing, with_timeout, ConfigFileBuilder, RuleBuilder};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use tokio::time::{sleep, Duration};

use derive::config::ConfigFile;
use derive::engine::Orchestrator;
use derive::errors::{DeriveError, Result as DeriveResult};
use derive::watch::{ChangeSource, Subscription, WatchNotification};
use derive_test_utils::fake_runner::FakeRunner;
use derive_test_utils::scripted_source::ScriptedSource;

type TestResult = Result<(), Box<dyn Error>>;

const ROOT: &str = "/repo";

fn project() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_rule(
            RuleBuilder::new("go")
                .matches("**/*.go")
                .matches("!**/*_test.go")
                .run("go build")
                .build(),
        )
        .with_rule(RuleBuilder::new("docs").matches("*.md").run("mdbook build").build())
        .with_rule(RuleBuilder::new("svc").run("compile svc").delegate("serve").build())
        .build()
}

fn orchestrator(runner: &FakeRunner) -> Orchestrator {
    Orchestrator::new(project(), Arc::new(runner.clone()))
}

#[tokio::test]
async fn startup_runs_every_rule_in_order() -> TestResult {
    init_tracing();
    let runner = FakeRunner::new();

    with_timeout(orchestrator(&runner).run_startup()).await?;

    assert_eq!(runner.commands(), vec!["go build", "mdbook build", "compile svc"]);
    let labels: Vec<String> = runner.calls().into_iter().map(|c| c.label).collect();
    assert_eq!(labels, vec!["go", "docs", "svc"]);
    Ok(())
}

#[tokio::test]
async fn startup_stops_at_first_failure() {
    init_tracing();
    let runner = FakeRunner::new().fail_on("mdbook build");

    let err = with_timeout(orchestrator(&runner).run_startup())
        .await
        .unwrap_err();

    assert!(matches!(err, DeriveError::CommandFailed { ref label, .. } if label == "docs"));
    assert_eq!(runner.commands(), vec!["go build", "mdbook build"]);
}

#[tokio::test]
async fn watch_dispatches_changed_files_until_stream_ends() -> TestResult {
    init_tracing();
    let runner = FakeRunner::new().with_delay(Duration::from_millis(1));
    let source = ScriptedSource::finite(vec![
        WatchNotification::changed(["cmd/main.go"]),
        WatchNotification::changed(["README.md", "cmd/main.go"]),
        WatchNotification::changed(["cmd/main_test.go", "notes.txt"]),
    ]);

    with_timeout(orchestrator(&runner).watch(source, Path::new(ROOT), std::future::pending()))
        .await?;

    let go = runner.count_for("go build");
    assert!((1..=2).contains(&go), "go build ran {go} times");
    assert_eq!(runner.count_for("mdbook build"), 1);
    assert_eq!(runner.count_for("compile svc"), 0);
    Ok(())
}

/// Fresh-instance notifications describe an initial sync, not changes.
#[tokio::test]
async fn fresh_instance_notifications_are_ignored() -> TestResult {
    init_tracing();
    let runner = FakeRunner::new().with_delay(Duration::from_millis(1));
    let source = ScriptedSource::finite(vec![
        WatchNotification {
            fresh_instance: true,
            files: vec!["cmd/main.go".to_string(), "README.md".to_string()],
        },
        WatchNotification::fresh_instance(),
    ]);

    with_timeout(orchestrator(&runner).watch(source, Path::new(ROOT), std::future::pending()))
        .await?;

    assert_eq!(runner.count_for("go build"), 0);
    assert_eq!(runner.count_for("mdbook build"), 0);
    Ok(())
}

#[tokio::test]
async fn delegates_run_during_watch_and_stop_afterwards() -> TestResult {
    init_tracing();
    let runner = FakeRunner::new().with_delay(Duration::from_millis(10));
    let (source, tx) = ScriptedSource::new();
    let orchestrator = orchestrator(&runner);

    let closer = tokio::spawn(async move {
        sleep(Duration::from_millis(80)).await;
        drop(tx);
    });

    with_timeout(orchestrator.watch(source, Path::new(ROOT), std::future::pending())).await?;
    closer.await?;

    let serves = runner.count_for("serve");
    assert!(serves >= 2, "delegate should have restarted, ran {serves} times");

    sleep(Duration::from_millis(50)).await;
    assert_eq!(runner.count_for("serve"), serves, "delegate must be stopped");
    assert!(runner.calls().iter().filter(|c| c.command == "serve").all(|c| c.label == "svc"));
    Ok(())
}

/// A failing command during dispatch ends the watch loop with an error;
/// notifications sent afterwards are never processed.
#[tokio::test]
async fn dispatch_failure_is_fatal() -> TestResult {
    init_tracing();
    let runner = FakeRunner::new().fail_on("mdbook build")
        .with_delay(Duration::from_millis(1));
    let (source, tx) = ScriptedSource::new();
    tx.send(WatchNotification::changed(["README.md"]))?;

    let result =
        with_timeout(orchestrator(&runner).watch(source, Path::new(ROOT), std::future::pending()))
            .await;

    match result {
        Err(DeriveError::CommandFailed { label, .. }) => assert_eq!(label, "docs"),
        other => panic!("Expected CommandFailed, got: {other:?}"),
    }

    // The loop is gone; nothing reacts to further changes.
    let _ = tx.send(WatchNotification::changed(["cmd/main.go"]));
    sleep(Duration::from_millis(20)).await;
    assert_eq!(runner.count_for("go build"), 0);
    Ok(())
}

#[tokio::test]
async fn shutdown_signal_ends_watch_cleanly() -> TestResult {
    init_tracing();
    let runner = FakeRunner::new().with_delay(Duration::from_millis(5));
    let (source, _tx) = ScriptedSource::new();

    with_timeout(orchestrator(&runner).watch(
        source,
        Path::new(ROOT),
        sleep(Duration::from_millis(40)),
    ))
    .await?;

    let serves = runner.count_for("serve");
    sleep(Duration::from_millis(30)).await;
    assert_eq!(runner.count_for("serve"), serves);
    Ok(())
}

/// A source that cannot watch anything.
struct BrokenSource;

impl ChangeSource for BrokenSource {
    fn add_watch(&mut self, root: &Path) -> DeriveResult<()> {
        Err(DeriveError::WatchError(format!("cannot watch {root:?}")))
    }

    fn subscribe(&mut self, _name: &str, _root: &Path) -> DeriveResult<Subscription> {
        unreachable!("subscribe must not be called after add_watch fails")
    }
}

#[tokio::test]
async fn watch_source_errors_are_fatal() {
    init_tracing();
    let runner = FakeRunner::new().with_delay(Duration::from_millis(5));

    let result =
        with_timeout(orchestrator(&runner).watch(BrokenSource, Path::new(ROOT), std::future::pending()))
            .await;

    assert!(matches!(result, Err(DeriveError::WatchError(_))));
}
