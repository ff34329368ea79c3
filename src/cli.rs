// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::exec::DEFAULT_SHELL;

/// Command-line arguments for `derive`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "derive",
    version,
    about = "Run rule commands once, then re-run them when matching files change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the rule file (YAML).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Keep running: supervise delegates and re-run rules on file changes.
    #[arg(long)]
    pub watch: bool,

    /// Shell used to interpret `run` and `delegate` commands.
    #[arg(long, value_name = "SHELL", default_value = DEFAULT_SHELL)]
    pub shell: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DERIVE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the rule file, print it, but run nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
