// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::engine::Orchestrator;
use crate::errors::Result;
use crate::exec::ShellRunner;
use crate::watch::NotifySource;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - rule loading and validation
/// - the startup run of every rule
/// - (with `--watch`) delegate supervision and the file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;
    info!(rules = cfg.len(), config = ?args.config, "loaded rules");

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let runner = Arc::new(ShellRunner::new(args.shell));
    let orchestrator = Orchestrator::new(cfg, runner);

    orchestrator.run_startup().await?;

    if !args.watch {
        return Ok(());
    }

    let root = std::env::current_dir()?;
    let source = NotifySource::connect()?;

    orchestrator.watch(source, &root, shutdown_signal()).await
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed the
/// process simply runs until it is killed.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Simple dry-run output: print rules, patterns and commands.
fn print_dry_run(cfg: &ConfigFile) {
    println!("derive dry-run");
    println!();

    println!("rules ({}):", cfg.len());
    for rule in cfg.rules() {
        println!("  - {}", rule.name());
        if !rule.patterns().is_empty() {
            println!("      match: {:?}", rule.patterns());
        }
        for cmd in rule.run_commands() {
            println!("      run: {cmd}");
        }
        for cmd in rule.delegate_commands() {
            println!("      delegate: {cmd}");
        }
    }

    debug!("dry-run complete (no execution)");
}
