//! In-memory ticket store.
//!
//! Tickets live in a `Vec` indexed by reference: a ticket's reference is the length
//! of the store at the moment it was appended, so lookups are a plain index and
//! references never skip or repeat.

use chrono::Utc;
use serde::Serialize;

use super::ticket::{Contact, QueueError, Reference, Ticket};

/// Ordered collection of tickets. Not synchronized; the owner serializes access.
#[derive(Debug, Default)]
pub struct QueueStore {
    tickets: Vec<Ticket>,
    /// Every ticket below this index is served.
    cursor: usize,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new unserved ticket for `contact`.
    pub fn append(&mut self, contact: Contact) -> Ticket {
        let reference = self.tickets.len() as Reference;
        let ticket = Ticket::new(reference, contact);
        self.tickets.push(ticket.clone());
        ticket
    }

    pub fn find_by_reference(&self, reference: Reference) -> Result<&Ticket, QueueError> {
        usize::try_from(reference)
            .ok()
            .and_then(|index| self.tickets.get(index))
            .ok_or(QueueError::NotFound(reference))
    }

    /// Mark a ticket served. Fails without mutating when the ticket is unknown or
    /// was already served.
    pub fn mark_served(&mut self, reference: Reference) -> Result<Ticket, QueueError> {
        let ticket = usize::try_from(reference)
            .ok()
            .and_then(|index| self.tickets.get_mut(index))
            .ok_or(QueueError::NotFound(reference))?;

        if ticket.served {
            return Err(QueueError::AlreadyServed(reference));
        }

        ticket.served = true;
        ticket.served_at = Some(Utc::now());
        let served = ticket.clone();

        self.advance_cursor();
        Ok(served)
    }

    /// The unserved ticket with the smallest reference.
    pub fn first_unserved(&self) -> Option<&Ticket> {
        self.tickets[self.cursor..].iter().find(|t| t.is_waiting())
    }

    pub fn all(&self) -> Vec<Ticket> {
        self.tickets.clone()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let served = self.tickets.iter().filter(|t| t.served).count();
        StoreStats {
            total: self.tickets.len(),
            served,
            waiting: self.tickets.len() - served,
            now_serving: self.first_unserved().map(|t| t.reference),
        }
    }

    fn advance_cursor(&mut self) {
        while self
            .tickets
            .get(self.cursor)
            .map_or(false, |t| t.served)
        {
            self.cursor += 1;
        }
    }
}

/// Ticket counts.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total: usize,
    pub served: usize,
    pub waiting: usize,
    pub now_serving: Option<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str) -> Contact {
        Contact::new(name, "+15550100", format!("{}@example.com", name.to_lowercase()))
    }

    #[test]
    fn test_append_assigns_sequential_references() {
        let mut store = QueueStore::new();

        for expected in 0..5 {
            let ticket = store.append(contact("Alice"));
            assert_eq!(ticket.reference, expected);
            assert!(!ticket.served);
        }

        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_find_by_reference() {
        let mut store = QueueStore::new();
        store.append(contact("Alice"));
        store.append(contact("Bob"));

        assert_eq!(store.find_by_reference(1).unwrap().contact.display_name, "Bob");
        assert_eq!(store.find_by_reference(2), Err(QueueError::NotFound(2)));
        assert_eq!(
            store.find_by_reference(u64::MAX),
            Err(QueueError::NotFound(u64::MAX))
        );
    }

    #[test]
    fn test_mark_served_once() {
        let mut store = QueueStore::new();
        store.append(contact("Alice"));

        let served = store.mark_served(0).unwrap();
        assert!(served.served);
        assert!(served.served_at.is_some());

        assert_eq!(store.mark_served(0), Err(QueueError::AlreadyServed(0)));
        assert_eq!(store.mark_served(3), Err(QueueError::NotFound(3)));
        assert_eq!(store.find_by_reference(0).unwrap().served_at, served.served_at);
    }

    #[test]
    fn test_first_unserved_is_fifo() {
        let mut store = QueueStore::new();
        assert!(store.first_unserved().is_none());

        for name in ["Alice", "Bob", "Carol", "Dan"] {
            store.append(contact(name));
        }

        // Serving out of order leaves the head where it was.
        store.mark_served(2).unwrap();
        assert_eq!(store.first_unserved().unwrap().reference, 0);

        store.mark_served(0).unwrap();
        assert_eq!(store.first_unserved().unwrap().reference, 1);

        store.mark_served(1).unwrap();
        assert_eq!(store.first_unserved().unwrap().reference, 3);

        store.mark_served(3).unwrap();
        assert!(store.first_unserved().is_none());

        store.append(contact("Eve"));
        assert_eq!(store.first_unserved().unwrap().reference, 4);
    }

    #[test]
    fn test_stats() {
        let mut store = QueueStore::new();
        store.append(contact("Alice"));
        store.append(contact("Bob"));
        store.mark_served(0).unwrap();

        assert_eq!(
            store.stats(),
            StoreStats {
                total: 2,
                served: 1,
                waiting: 1,
                now_serving: Some(1),
            }
        );
    }
}
