//! walkin library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod notify;
pub mod web;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use core::{Contact, QueueError, QueueService, Ticket};
pub use error::{Error, Result};
pub use notify::{create_notifier, spawn_dispatcher, Notifier, NotificationQueue};
pub use web::run_server;
