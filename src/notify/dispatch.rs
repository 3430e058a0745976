//! Background notification delivery.
//!
//! Queue operations hand jobs to a bounded channel without waiting; a single worker
//! task drains it and calls the notifier. Delivery outcomes only show up in logs and
//! in [`DeliveryStats`], never in the caller's result.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::messages::Notification;
use super::notifier::Notifier;

/// Delivery counters shared by the queue handle and the worker.
#[derive(Debug, Default)]
pub struct DeliveryCounters {
    enqueued: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl DeliveryCounters {
    pub fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time delivery counts.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub enqueued: u64,
    pub sent: u64,
    pub failed: u64,
    /// Jobs discarded because the queue was full or the worker was gone.
    pub dropped: u64,
}

/// Sending half of the notification queue.
#[derive(Clone, Debug)]
pub struct NotificationQueue {
    tx: mpsc::Sender<Notification>,
    counters: Arc<DeliveryCounters>,
}

impl NotificationQueue {
    /// Create a queue with room for `capacity` pending jobs.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let queue = Self {
            tx,
            counters: Arc::new(DeliveryCounters::default()),
        };
        (queue, rx)
    }

    /// Hand a job to the worker. Never waits; a full queue drops the job.
    pub fn enqueue(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(n)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    reference = n.reference,
                    kind = %n.kind,
                    "Notification queue full, dropping notification"
                );
            }
            Err(TrySendError::Closed(n)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    reference = n.reference,
                    kind = %n.kind,
                    "Notification worker stopped, dropping notification"
                );
            }
        }
    }

    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot()
    }

    pub fn counters(&self) -> Arc<DeliveryCounters> {
        Arc::clone(&self.counters)
    }
}

/// Spawn the delivery worker and return the queue feeding it.
///
/// The worker exits once every [`NotificationQueue`] clone is dropped and the
/// backlog is drained.
pub fn spawn_dispatcher(
    notifier: Arc<dyn Notifier>,
    capacity: usize,
) -> (NotificationQueue, JoinHandle<()>) {
    let (queue, rx) = NotificationQueue::channel(capacity);
    let handle = tokio::spawn(run_worker(notifier, rx, queue.counters()));
    (queue, handle)
}

async fn run_worker(
    notifier: Arc<dyn Notifier>,
    mut rx: mpsc::Receiver<Notification>,
    counters: Arc<DeliveryCounters>,
) {
    tracing::info!("Notification worker started ({})", notifier.name());

    while let Some(notification) = rx.recv().await {
        let message = notification.render();
        tracing::debug!(
            reference = notification.reference,
            kind = %notification.kind,
            "Sending notification to {}",
            notification.destination
        );

        match notifier.send(&message, &notification.destination).await {
            Ok(()) => {
                counters.sent.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    reference = notification.reference,
                    kind = %notification.kind,
                    "Notification sent"
                );
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    reference = notification.reference,
                    kind = %notification.kind,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }

    tracing::info!("Notification worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::messages::NotificationKind;
    use crate::notify::notifier::{NotifyError, Result};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records every delivery; fails for destinations starting with "fail".
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, message: &str, destination: &str) -> Result<()> {
            if destination.starts_with("fail") {
                return Err(NotifyError::Delivery("unreachable".to_string()));
            }
            self.sent
                .lock()
                .await
                .push((message.to_string(), destination.to_string()));
            Ok(())
        }
    }

    fn notification(reference: u64, destination: &str) -> Notification {
        Notification {
            kind: NotificationKind::Turn,
            reference,
            display_name: "Alice".to_string(),
            destination: destination.to_string(),
        }
    }

    #[tokio::test]
    async fn test_worker_delivers_and_counts() {
        crate::logging::init_test();
        let notifier = Arc::new(RecordingNotifier::default());
        let (queue, handle) = spawn_dispatcher(notifier.clone(), 8);

        queue.enqueue(notification(0, "+15550001"));
        queue.enqueue(notification(1, "fail-number"));
        queue.enqueue(notification(2, "+15550002"));

        let counters = queue.counters();
        drop(queue);
        handle.await.unwrap();

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, "+15550001");
        assert!(sent[1].0.contains("reference number is 2"));

        assert_eq!(
            counters.snapshot(),
            DeliveryStats {
                enqueued: 3,
                sent: 2,
                failed: 1,
                dropped: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let (queue, _rx) = NotificationQueue::channel(1);

        queue.enqueue(notification(0, "+15550001"));
        queue.enqueue(notification(1, "+15550002"));

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[tokio::test]
    async fn test_closed_queue_drops() {
        let (queue, rx) = NotificationQueue::channel(4);
        drop(rx);

        queue.enqueue(notification(0, "+15550001"));
        assert_eq!(queue.stats().dropped, 1);
    }
}
