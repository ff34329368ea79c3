// src/exec/backend.rs

//! Pluggable command runner abstraction.
//!
//! The dispatcher, the orchestrator and the delegate supervisors talk to a
//! `CommandRunner` instead of spawning processes directly. Production code
//! uses [`ShellRunner`](super::ShellRunner); tests can swap in a runner that
//! records invocations without touching the OS.

use std::future::Future;
use std::pin::Pin;

use crate::errors::{DeriveError, Result};

/// How a finished command exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

/// Boxed future returned by [`CommandRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandOutcome>> + Send + 'a>>;

/// Trait abstracting how a single command is executed.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion, labelling its output with `label`.
    ///
    /// Returns `Err` only when the command could not be started or waited
    /// on; a non-zero exit is reported through the outcome.
    fn run<'a>(&'a self, command: &'a str, label: &'a str) -> RunFuture<'a>;
}

/// Run a command and treat anything but a successful exit as an error.
///
/// Used for `run` commands, where a failure aborts the whole program.
pub async fn run_checked<R>(runner: &R, command: &str, label: &str) -> Result<()>
where
    R: CommandRunner + ?Sized,
{
    let outcome = runner.run(command, label).await?;
    if outcome.success {
        Ok(())
    } else {
        Err(DeriveError::CommandFailed {
            label: label.to_string(),
            command: command.to_string(),
            code: outcome.code,
        })
    }
}
