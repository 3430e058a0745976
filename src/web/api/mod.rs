//! API endpoints module.

pub mod queue;

pub use queue::{get_ticket, list_users, queue_stats, register_user, serve_user, TICKET_REFERENCE_HEADER};
