// src/engine/dispatcher.rs

use std::sync::Arc;

use tracing::info;

use crate::config::Rule;
use crate::engine::core::DirtySet;
use crate::errors::Result;
use crate::exec::{run_checked, CommandRunner};

/// Runs the dirty rules for each coalesced batch of changes.
///
/// Rules run one after another in declaration order; each rule's commands
/// run in order. The first failing command aborts the dispatch.
pub struct Dispatcher {
    rules: Arc<[Rule]>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(rules: Arc<[Rule]>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { rules, runner }
    }

    /// Run every rule made dirty by `files`, returning the names of the
    /// rules that ran. An empty dirty set returns immediately without
    /// logging or running anything.
    pub async fn dispatch(&self, files: &[String]) -> Result<Vec<String>> {
        let dirty = DirtySet::compute(&self.rules, files);
        if dirty.is_empty() {
            return Ok(Vec::new());
        }

        info!(files = %files.join(", "), "files changed");

        for rule in dirty.iter() {
            run_rule(self.runner.as_ref(), rule).await?;
        }

        info!(rules = ?dirty.names(), "done");
        Ok(dirty.names())
    }
}

/// Run all of `rule`'s `run` commands in order, labelled with its name.
pub async fn run_rule(runner: &dyn CommandRunner, rule: &Rule) -> Result<()> {
    for command in rule.run_commands() {
        info!(rule = %rule.name(), cmd = %command, "running");
        run_checked(runner, command, rule.name()).await?;
    }
    Ok(())
}
