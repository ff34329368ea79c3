// src/watch/source.rs

//! Change sources: where file-change notifications come from.
//!
//! The orchestrator only depends on the [`ChangeSource`] trait. The
//! production implementation, [`NotifySource`], wraps a recursive `notify`
//! watcher; tests provide scripted sources.

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{DeriveError, Result};
use crate::watch::path_utils::relative_str;

/// One notification delivered by a change source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchNotification {
    /// Set when the notification describes an initial sync or a rescan
    /// rather than real changes. Such notifications never trigger rules.
    pub fresh_instance: bool,
    /// Changed paths, relative to the watched root with `/` separators.
    pub files: Vec<String>,
}

impl WatchNotification {
    pub fn changed<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fresh_instance: false,
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fresh_instance() -> Self {
        Self {
            fresh_instance: true,
            files: Vec::new(),
        }
    }
}

/// Stream of notifications for one named subscription.
#[derive(Debug)]
pub struct Subscription {
    name: String,
    rx: mpsc::UnboundedReceiver<WatchNotification>,
}

impl Subscription {
    pub fn new(name: impl Into<String>, rx: mpsc::UnboundedReceiver<WatchNotification>) -> Self {
        Self {
            name: name.into(),
            rx,
        }
    }

    /// Create a subscription together with the sender that feeds it.
    pub fn channel(name: impl Into<String>) -> (mpsc::UnboundedSender<WatchNotification>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(name, rx))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next notification, or `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<WatchNotification> {
        self.rx.recv().await
    }
}

/// A source of file-change notifications.
///
/// Connecting is done by the implementation's constructor; a failure there,
/// in [`add_watch`](Self::add_watch) or in [`subscribe`](Self::subscribe)
/// is fatal to the caller.
pub trait ChangeSource: Send {
    /// Start watching `root` recursively.
    fn add_watch(&mut self, root: &Path) -> Result<()>;

    /// Begin delivering notifications for a previously watched `root`.
    fn subscribe(&mut self, name: &str, root: &Path) -> Result<Subscription>;
}

/// [`ChangeSource`] backed by the platform's recommended `notify` watcher.
pub struct NotifySource {
    watcher: RecommendedWatcher,
    raw_rx: Option<mpsc::UnboundedReceiver<notify::Result<Event>>>,
    roots: Vec<(PathBuf, PathBuf)>,
}

impl std::fmt::Debug for NotifySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifySource")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl NotifySource {
    /// Create the underlying watcher.
    pub fn connect() -> Result<Self> {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        // Called synchronously on notify's own thread.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Receiver dropped means the subscription is gone; nothing to do.
                let _ = raw_tx.send(res);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            raw_rx: Some(raw_rx),
            roots: Vec::new(),
        })
    }

    fn watched_root(&self, root: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .find(|(requested, canonical)| requested == root || canonical == root)
            .map(|(_, canonical)| canonical.as_path())
    }
}

impl ChangeSource for NotifySource {
    fn add_watch(&mut self, root: &Path) -> Result<()> {
        let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        self.watcher.watch(&canonical, RecursiveMode::Recursive)?;
        info!(root = ?canonical, "watching directory");
        self.roots.push((root.to_path_buf(), canonical));
        Ok(())
    }

    fn subscribe(&mut self, name: &str, root: &Path) -> Result<Subscription> {
        let root = self
            .watched_root(root)
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                DeriveError::WatchError(format!("cannot subscribe to unwatched directory {root:?}"))
            })?;

        let mut raw_rx = self.raw_rx.take().ok_or_else(|| {
            DeriveError::WatchError(format!("subscription '{name}': source already subscribed"))
        })?;

        let (tx, subscription) = Subscription::channel(name);
        let sub_name = name.to_string();

        tokio::spawn(async move {
            while let Some(res) = raw_rx.recv().await {
                let event = match res {
                    Ok(event) => event,
                    Err(err) => {
                        warn!(subscription = %sub_name, error = %err, "file watch error");
                        continue;
                    }
                };

                debug!(?event, "received notify event");

                if let Some(notification) = notification_from_event(&root, event) {
                    if tx.send(notification).is_err() {
                        break;
                    }
                }
            }
            debug!(subscription = %sub_name, "notify event loop finished");
        });

        Ok(subscription)
    }
}

/// Translate a raw `notify` event into a notification relative to `root`.
///
/// Access-only events are not changes and yield `None`, as do events whose
/// paths all fall outside `root`. Events flagged for a rescan become
/// fresh-instance notifications.
pub fn notification_from_event(root: &Path, event: Event) -> Option<WatchNotification> {
    if matches!(event.kind, EventKind::Access(_)) {
        return None;
    }

    let fresh_instance = event.need_rescan();

    let mut files = Vec::with_capacity(event.paths.len());
    for path in &event.paths {
        match relative_str(root, path) {
            Some(rel) => files.push(rel),
            None => warn!(?path, ?root, "could not relativize path against watched root"),
        }
    }

    if files.is_empty() && !fresh_instance {
        return None;
    }

    Some(WatchNotification {
        fresh_instance,
        files,
    })
}
