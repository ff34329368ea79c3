use std::path::{Path, PathBuf};

use derive::errors::{DeriveError, Result};
use derive::watch::{ChangeSource, Subscription, WatchNotification};
use tokio::sync::mpsc;

/// A `ChangeSource` whose notifications are supplied by the test.
///
/// Notifications sent before `subscribe` are buffered, so a test can queue
/// a whole burst up front. The stream ends once every sender is dropped.
#[derive(Debug)]
pub struct ScriptedSource {
    rx: Option<mpsc::UnboundedReceiver<WatchNotification>>,
    watched: Vec<PathBuf>,
}

impl ScriptedSource {
    /// A live source plus the sender used to push notifications into it.
    pub fn new() -> (Self, mpsc::UnboundedSender<WatchNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            rx: Some(rx),
            watched: Vec::new(),
        };
        (source, tx)
    }

    /// A source that delivers `notifications` and then ends.
    pub fn finite(notifications: Vec<WatchNotification>) -> Self {
        let (source, tx) = Self::new();
        for notification in notifications {
            tx.send(notification).expect("receiver is held by the source");
        }
        source
    }
}

impl ChangeSource for ScriptedSource {
    fn add_watch(&mut self, root: &Path) -> Result<()> {
        self.watched.push(root.to_path_buf());
        Ok(())
    }

    fn subscribe(&mut self, name: &str, root: &Path) -> Result<Subscription> {
        if !self.watched.iter().any(|w| w == root) {
            return Err(DeriveError::WatchError(format!(
                "cannot subscribe to unwatched directory {root:?}"
            )));
        }
        let rx = self.rx.take().ok_or_else(|| {
            DeriveError::WatchError(format!("subscription '{name}': source already subscribed"))
        })?;
        Ok(Subscription::new(name, rx))
    }
}
