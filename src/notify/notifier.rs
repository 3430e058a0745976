//! Outbound notifier trait.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid request made to the messaging service: {0}")]
    Rejected(String),

    #[error("Unexpected response received from messaging service: {0}")]
    Delivery(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;

/// Delivers a rendered message to a destination address.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier name, for logs.
    fn name(&self) -> &str;

    /// Send `message` to `destination`.
    async fn send(&self, message: &str, destination: &str) -> Result<()>;
}
