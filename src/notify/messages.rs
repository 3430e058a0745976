//! Message templates.

use serde::Serialize;

use crate::core::{Reference, Ticket};

/// Why a ticket holder is being contacted.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Sent right after registration.
    Registered,
    /// Sent when the ticket reaches the head of the queue.
    Turn,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Registered => write!(f, "registered"),
            NotificationKind::Turn => write!(f, "turn"),
        }
    }
}

/// A notification job, detached from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub reference: Reference,
    pub display_name: String,
    pub destination: String,
}

impl Notification {
    /// Build a job for `ticket`, or `None` when the holder left no contact address.
    pub fn for_ticket(kind: NotificationKind, ticket: &Ticket) -> Option<Self> {
        if !ticket.contact.wants_notification() {
            return None;
        }

        Some(Self {
            kind,
            reference: ticket.reference,
            display_name: ticket.contact.display_name.clone(),
            destination: ticket.contact.contact_address.clone(),
        })
    }

    pub fn render(&self) -> String {
        match self.kind {
            NotificationKind::Registered => format!(
                "Hello {}, you have been assigned NO: \"{}\". \nWill text you when it's your turn to get served",
                self.display_name, self.reference
            ),
            NotificationKind::Turn => format!(
                "Hello {}, it's your turn to be served. Your reference number is {}",
                self.display_name, self.reference
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Contact, QueueStore};

    fn ticket_with_address(address: &str) -> Ticket {
        let mut store = QueueStore::new();
        store.append(Contact::new("Skip", "", "skip@example.com"));
        store.append(Contact::new("Alice", address, "alice@example.com"))
    }

    #[test]
    fn test_registration_message() {
        let ticket = ticket_with_address("+15550001");
        let notification = Notification::for_ticket(NotificationKind::Registered, &ticket).unwrap();

        assert_eq!(notification.destination, "+15550001");
        assert_eq!(
            notification.render(),
            "Hello Alice, you have been assigned NO: \"1\". \nWill text you when it's your turn to get served"
        );
    }

    #[test]
    fn test_turn_message() {
        let ticket = ticket_with_address("+15550001");
        let notification = Notification::for_ticket(NotificationKind::Turn, &ticket).unwrap();

        assert_eq!(
            notification.render(),
            "Hello Alice, it's your turn to be served. Your reference number is 1"
        );
    }

    #[test]
    fn test_no_notification_without_address() {
        let ticket = ticket_with_address("");
        assert!(Notification::for_ticket(NotificationKind::Turn, &ticket).is_none());
    }
}
