//! Core module - the ticket queue.
//!
//! - `ticket`: ticket and contact types, queue errors
//! - `store`: the ordered ticket collection
//! - `service`: register / serve-next with locking and notification side effects

pub mod service;
pub mod store;
pub mod ticket;

pub use service::{QueueService, QueueStats, Registration};
pub use store::{QueueStore, StoreStats};
pub use ticket::{Contact, QueueError, Reference, Ticket};
