//! Queue service: registration and serve-next on top of the store.
//!
//! Every store access goes through one mutex, so reference assignment and
//! mark-then-find-next are each a single serialized step. Notifications are queued
//! after the lock is released and never affect the result.

use serde::Serialize;
use tokio::sync::Mutex;

use super::store::{QueueStore, StoreStats};
use super::ticket::{Contact, QueueError, Reference, Ticket};
use crate::notify::{DeliveryStats, Notification, NotificationKind, NotificationQueue};

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The ticket just created for the caller.
    pub ticket: Ticket,
    /// Head of the queue after registering.
    pub now_serving: Option<Ticket>,
}

/// Queue and delivery counts.
#[derive(Serialize, Debug, Clone)]
pub struct QueueStats {
    pub queue: StoreStats,
    pub notifications: DeliveryStats,
}

impl std::fmt::Display for QueueStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Queue Stats:")?;
        writeln!(f, "  Total:   {}", self.queue.total)?;
        writeln!(f, "  Served:  {}", self.queue.served)?;
        writeln!(f, "  Waiting: {}", self.queue.waiting)?;
        match self.queue.now_serving {
            Some(reference) => writeln!(f, "  Serving: {}", reference)?,
            None => writeln!(f, "  Serving: -")?,
        }
        write!(
            f,
            "  Notifications: {} sent, {} failed, {} dropped",
            self.notifications.sent, self.notifications.failed, self.notifications.dropped
        )
    }
}

/// Owns the store for the life of the process.
pub struct QueueService {
    store: Mutex<QueueStore>,
    notifications: NotificationQueue,
}

impl QueueService {
    pub fn new(notifications: NotificationQueue) -> Self {
        Self {
            store: Mutex::new(QueueStore::new()),
            notifications,
        }
    }

    /// Register a new ticket and report the current queue head.
    pub async fn register(&self, contact: Contact) -> Result<Registration, QueueError> {
        contact.validate()?;

        let (ticket, now_serving) = {
            let mut store = self.store.lock().await;
            let ticket = store.append(contact);
            (ticket, store.first_unserved().cloned())
        };

        tracing::info!(
            reference = ticket.reference,
            "Registered {}",
            ticket.contact.display_name
        );

        self.notify(NotificationKind::Registered, &ticket);

        Ok(Registration {
            ticket,
            now_serving,
        })
    }

    /// Close out `reference` and return the ticket to call next.
    pub async fn serve_next(&self, reference: Reference) -> Result<Option<Ticket>, QueueError> {
        let next = {
            let mut store = self.store.lock().await;
            store.mark_served(reference)?;
            store.first_unserved().cloned()
        };

        match &next {
            Some(ticket) => {
                tracing::info!(served = reference, next = ticket.reference, "Served ticket");
                self.notify(NotificationKind::Turn, ticket);
            }
            None => tracing::info!(served = reference, "Served ticket, queue is empty"),
        }

        Ok(next)
    }

    /// All tickets in registration order.
    pub async fn list_all(&self) -> Vec<Ticket> {
        self.store.lock().await.all()
    }

    pub async fn find(&self, reference: Reference) -> Result<Ticket, QueueError> {
        self.store.lock().await.find_by_reference(reference).cloned()
    }

    pub async fn stats(&self) -> QueueStats {
        let queue = self.store.lock().await.stats();
        QueueStats {
            queue,
            notifications: self.notifications.stats(),
        }
    }

    fn notify(&self, kind: NotificationKind, ticket: &Ticket) {
        match Notification::for_ticket(kind, ticket) {
            Some(notification) => self.notifications.enqueue(notification),
            None => tracing::debug!(
                reference = ticket.reference,
                "No contact address, skipping {} notification",
                kind
            ),
        }
    }
}
