// src/exec/delegate.rs

//! Supervision of long-lived `delegate` commands.
//!
//! Every delegate command runs in its own Tokio task that restarts it as
//! soon as it exits, whatever the exit status. There is no backoff and no
//! restart limit; a delegate only stops when its handle is aborted or the
//! process ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Rule;
use crate::exec::backend::CommandRunner;

/// Handle for one supervised delegate command.
///
/// Aborting the handle drops the running child, which kills it.
#[derive(Debug)]
pub struct DelegateHandle {
    rule: String,
    command: String,
    runs: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl DelegateHandle {
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Number of times the command has exited (and been restarted) so far.
    pub fn completed_runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Start supervising `command` for rule `rule`.
pub fn supervise(
    runner: Arc<dyn CommandRunner>,
    rule: impl Into<String>,
    command: impl Into<String>,
) -> DelegateHandle {
    let rule = rule.into();
    let command = command.into();
    let runs = Arc::new(AtomicU64::new(0));

    let handle = tokio::spawn({
        let rule = rule.clone();
        let command = command.clone();
        let runs = Arc::clone(&runs);
        async move {
            info!(rule = %rule, cmd = %command, "starting delegate");
            loop {
                match runner.run(&command, &rule).await {
                    Ok(outcome) => debug!(
                        rule = %rule,
                        exit_code = ?outcome.code,
                        success = outcome.success,
                        "delegate exited"
                    ),
                    Err(err) => warn!(rule = %rule, error = %err, "delegate failed to run"),
                }

                runs.fetch_add(1, Ordering::SeqCst);
                info!(rule = %rule, "restarting delegate");

                // A command that fails to spawn returns without ever
                // suspending; give other tasks a turn before looping.
                tokio::task::yield_now().await;
            }
        }
    });

    DelegateHandle {
        rule,
        command,
        runs,
        handle,
    }
}

/// All delegate supervisors started for a rule set.
#[derive(Debug, Default)]
pub struct Delegates {
    handles: Vec<DelegateHandle>,
}

impl Delegates {
    /// Start one supervisor per delegate command across all rules, in
    /// declaration order.
    pub fn spawn_all(runner: Arc<dyn CommandRunner>, rules: &[Rule]) -> Self {
        let handles = rules
            .iter()
            .flat_map(|rule| {
                rule.delegate_commands()
                    .iter()
                    .map(move |cmd| (rule.name(), cmd.as_str()))
            })
            .map(|(name, cmd)| supervise(Arc::clone(&runner), name, cmd))
            .collect();
        Self { handles }
    }

    pub fn handles(&self) -> &[DelegateHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort every supervisor, killing the running children.
    pub fn abort_all(&self) {
        for handle in &self.handles {
            debug!(rule = %handle.rule, cmd = %handle.command, "stopping delegate");
            handle.abort();
        }
    }
}
