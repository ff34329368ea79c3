use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use derive::exec::{CommandOutcome, CommandRunner, RunFuture};

/// One recorded `CommandRunner::run` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub label: String,
    pub command: String,
}

/// A fake runner that:
/// - records every command it is asked to run
/// - reports success, except for commands registered with `fail_on`
/// - optionally sleeps before "finishing" each command.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    delay: Option<Duration>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` exit with status 1.
    pub fn fail_on(self, command: &str) -> Self {
        self.failing.lock().unwrap().insert(command.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    pub fn count_for(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.command == command)
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(&'a self, command: &'a str, label: &'a str) -> RunFuture<'a> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Invocation {
                label: label.to_string(),
                command: command.to_string(),
            });

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing.lock().unwrap().contains(command) {
                Ok(CommandOutcome::failed(1))
            } else {
                Ok(CommandOutcome::success())
            }
        })
    }
}
