// src/exec/command.rs

//! Shell command execution with line-prefixed output streaming.

use std::io::Write;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{DeriveError, Result};
use crate::exec::backend::{CommandOutcome, CommandRunner, RunFuture};

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "bash";

/// Where prefixed command output lines end up.
#[derive(Debug, Clone)]
pub enum OutputSink {
    /// The process's own standard output.
    Stdout,
    /// An in-memory channel receiving fully formatted `label: line` strings.
    Channel(mpsc::UnboundedSender<String>),
}

impl OutputSink {
    /// Create a channel sink and the receiver that collects its lines.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OutputSink::Channel(tx), rx)
    }

    fn emit(&self, label: &str, line: &str) {
        match self {
            OutputSink::Stdout => {
                let mut out = std::io::stdout().lock();
                if let Err(err) = writeln!(out, "{label}: {line}").and_then(|_| out.flush()) {
                    debug!(rule = %label, error = %err, "failed to write command output");
                }
            }
            OutputSink::Channel(tx) => {
                // Receiver gone means nobody is collecting; drop the line.
                let _ = tx.send(format!("{label}: {line}"));
            }
        }
    }
}

/// Production [`CommandRunner`]: runs commands through a shell.
///
/// Stdout and stderr are both piped and forwarded line by line, as they are
/// produced, to the configured [`OutputSink`] with a `label: ` prefix.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    sink: OutputSink,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            sink: OutputSink::Stdout,
        }
    }

    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    async fn run_shell(&self, command: &str, label: &str) -> Result<CommandOutcome> {
        debug!(rule = %label, cmd = %command, shell = %self.shell, "spawning command");

        let mut cmd = build_shell_command(&self.shell, command);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| DeriveError::SpawnError {
            label: label.to_string(),
            command: command.to_string(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained concurrently with the wait so a chatty child
        // can never block on a full pipe buffer.
        let (status, (), ()) = tokio::join!(
            child.wait(),
            forward_lines(stdout, &self.sink, label),
            forward_lines(stderr, &self.sink, label),
        );

        let status =
            status.with_context(|| format!("waiting for process of rule '{label}'"))?;

        let outcome = CommandOutcome {
            success: status.success(),
            code: status.code(),
        };

        info!(
            rule = %label,
            exit_code = ?outcome.code,
            success = outcome.success,
            "command exited"
        );

        Ok(outcome)
    }
}

impl CommandRunner for ShellRunner {
    fn run<'a>(&'a self, command: &'a str, label: &'a str) -> RunFuture<'a> {
        Box::pin(self.run_shell(command, label))
    }
}

/// Build a shell invocation appropriate for the platform.
pub fn build_shell_command(shell: &str, command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new(shell);
        c.arg("-c").arg(command);
        c
    }
}

/// Read `reader` to EOF, emitting one prefixed line per newline-terminated
/// chunk. A trailing partial line is emitted too.
async fn forward_lines<R>(reader: Option<R>, sink: &OutputSink, label: &str)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => sink.emit(label, &trim_line_ending(&buf)),
            Err(err) => {
                warn!(rule = %label, error = %err, "failed to read command output");
                break;
            }
        }
    }
}

fn trim_line_ending(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
