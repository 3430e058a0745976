//! Notifier that only writes messages to the log.

use async_trait::async_trait;

use super::notifier::{Notifier, Result};

/// Used when no SMS credentials are configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &str, destination: &str) -> Result<()> {
        tracing::info!(destination, "Notification (not sent): {}", message);
        Ok(())
    }
}
