// src/engine/runtime.rs

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigFile, Rule};
use crate::engine::dispatcher::{run_rule, Dispatcher};
use crate::errors::Result;
use crate::exec::{CommandRunner, Delegates};
use crate::watch::{ChangeCoalescer, ChangeSource};

/// Name under which the orchestrator subscribes to its change source.
pub const SUBSCRIPTION_NAME: &str = "derive";

/// Ties rules, the command runner and a change source together.
///
/// The rule list is shared read-only with the dispatcher and the delegate
/// supervisors; nothing mutates it after construction.
pub struct Orchestrator {
    rules: Arc<[Rule]>,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(config: ConfigFile, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            rules: config.into_rules().into(),
            runner,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.rules), Arc::clone(&self.runner))
    }

    /// Run every rule's `run` commands once, in declaration order.
    pub async fn run_startup(&self) -> Result<()> {
        info!(rules = self.rules.len(), "executing rules");
        for rule in self.rules.iter() {
            run_rule(self.runner.as_ref(), rule).await?;
        }
        info!("done");
        Ok(())
    }

    /// Start one supervisor per delegate command.
    pub fn start_delegates(&self) -> Delegates {
        let delegates = Delegates::spawn_all(Arc::clone(&self.runner), &self.rules);
        if !delegates.is_empty() {
            info!(count = delegates.len(), "running delegates");
        }
        delegates
    }

    /// Watch mode: supervise delegates and dispatch coalesced changes under
    /// `root` until the change stream ends, a command fails, or `shutdown`
    /// resolves.
    ///
    /// Delegates are stopped before returning, whatever the reason.
    pub async fn watch<S, F>(&self, source: S, root: &Path, shutdown: F) -> Result<()>
    where
        S: ChangeSource,
        F: Future<Output = ()>,
    {
        let delegates = self.start_delegates();
        let result = self.watch_changes(source, root, shutdown).await;
        delegates.abort_all();
        result
    }

    async fn watch_changes<S, F>(&self, mut source: S, root: &Path, shutdown: F) -> Result<()>
    where
        S: ChangeSource,
        F: Future<Output = ()>,
    {
        source.add_watch(root)?;
        let subscription = source.subscribe(SUBSCRIPTION_NAME, root)?;
        let (coalescer, listener) = ChangeCoalescer::from_subscription(subscription);

        info!(root = ?root, "watching files");

        let dispatcher = self.dispatcher();
        let dispatcher = &dispatcher;

        let result = tokio::select! {
            res = coalescer.run(move |files| async move {
                dispatcher.dispatch(&files).await.map(|_| ())
            }) => {
                debug!("change stream ended");
                res
            }
            () = shutdown => {
                info!("shutdown requested; stopping");
                Ok(())
            }
        };

        listener.abort();
        result
    }
}
