// src/watch/coalescer.rs

//! Coalescing of bursty change notifications.
//!
//! A single filesystem operation often produces a flurry of notifications.
//! Rather than dispatching each one, a listener task pushes file lists into
//! a bounded queue and the coalescer, once woken by the first batch, drains
//! everything already queued without waiting and yields a single sorted,
//! deduplicated list. There is no debounce timer: grouping depends only on
//! how much piled up while the previous dispatch was running.

use std::collections::BTreeSet;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::errors::Result;
use crate::watch::source::Subscription;

/// Capacity of the queue between the listener and the coalescer.
pub const QUEUE_CAPACITY: usize = 100;

/// File paths reported by one notification.
pub type ChangeBatch = Vec<String>;

/// Union of `batches`, deduplicated and sorted lexicographically.
pub fn coalesce<I>(batches: I) -> Vec<String>
where
    I: IntoIterator<Item = ChangeBatch>,
{
    batches
        .into_iter()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Forward real change notifications from `subscription` into `queue`.
///
/// Fresh-instance notifications and empty file lists are dropped. The task
/// ends when the subscription ends or the coalescer is gone.
pub fn spawn_listener(
    mut subscription: Subscription,
    queue: mpsc::Sender<ChangeBatch>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = subscription.next().await {
            if notification.fresh_instance {
                debug!(subscription = %subscription.name(), "ignoring fresh-instance notification");
                continue;
            }
            if notification.files.is_empty() {
                continue;
            }

            trace!(files = ?notification.files, "queueing change batch");
            if queue.send(notification.files).await.is_err() {
                break;
            }
        }
        debug!(subscription = %subscription.name(), "notification listener finished");
    })
}

/// Consumer side of the change queue.
#[derive(Debug)]
pub struct ChangeCoalescer {
    rx: mpsc::Receiver<ChangeBatch>,
}

impl ChangeCoalescer {
    /// Create a coalescer with a queue of the given capacity, returning the
    /// producer half alongside it.
    pub fn new(capacity: usize) -> (mpsc::Sender<ChangeBatch>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }

    /// Wire a coalescer to a subscription through a listener task.
    pub fn from_subscription(subscription: Subscription) -> (Self, JoinHandle<()>) {
        let (tx, coalescer) = Self::new(QUEUE_CAPACITY);
        let listener = spawn_listener(subscription, tx);
        (coalescer, listener)
    }

    /// Wait for the next batch, then fold in every batch already queued.
    ///
    /// Returns `None` once all producers are gone and the queue is empty.
    pub async fn next_batch(&mut self) -> Option<Vec<String>> {
        let first = self.rx.recv().await?;
        let mut batches = vec![first];

        while let Ok(batch) = self.rx.try_recv() {
            batches.push(batch);
        }

        debug!(batches = batches.len(), "coalesced change batches");
        Some(coalesce(batches))
    }

    /// Invoke `on_batch` once per drain cycle until the stream ends.
    ///
    /// The next drain only starts after `on_batch` has completed, and the
    /// first error it returns stops the loop.
    pub async fn run<F, Fut>(mut self, mut on_batch: F) -> Result<()>
    where
        F: FnMut(Vec<String>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        while let Some(files) = self.next_batch().await {
            on_batch(files).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(files: &[&str]) -> ChangeBatch {
        files.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn coalesce_dedups_and_sorts() {
        let out = coalesce(vec![batch(&["b", "a", "a", "c"]), batch(&["a"])]);
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn coalesce_is_idempotent() {
        let once = coalesce(vec![batch(&["z", "m", "a", "m"])]);
        let twice = coalesce(vec![once.clone()]);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn drains_everything_queued() {
        let (tx, mut coalescer) = ChangeCoalescer::new(QUEUE_CAPACITY);
        tx.send(batch(&["b", "a", "a", "c"])).await.unwrap();
        tx.send(batch(&["a"])).await.unwrap();

        assert_eq!(coalescer.next_batch().await.unwrap(), vec!["a", "b", "c"]);

        tx.send(batch(&["d"])).await.unwrap();
        assert_eq!(coalescer.next_batch().await.unwrap(), vec!["d"]);

        drop(tx);
        assert_eq!(coalescer.next_batch().await, None);
    }
}
