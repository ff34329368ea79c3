// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] defines the `CommandRunner` trait used everywhere else.
//! - [`command`] implements it with `tokio::process::Command`, streaming
//!   prefixed output line by line.
//! - [`delegate`] restarts long-lived commands forever.

pub mod backend;
pub mod command;
pub mod delegate;

pub use backend::{run_checked, CommandOutcome, CommandRunner, RunFuture};
pub use command::{build_shell_command, OutputSink, ShellRunner, DEFAULT_SHELL};
pub use delegate::{supervise, DelegateHandle, Delegates};
