//! Outbound notifications: message templates, notifiers and the delivery worker.

use std::sync::Arc;
use std::time::Duration;

pub mod dispatch;
pub mod log;
pub mod messages;
pub mod notifier;
pub mod twilio;

pub use dispatch::{spawn_dispatcher, DeliveryStats, NotificationQueue};
pub use messages::{Notification, NotificationKind};
pub use notifier::{Notifier, NotifyError, Result};

use crate::config::{NotifierConfig, NotifierKind};

/// Notifier factory.
pub fn create_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    match config.resolved_kind() {
        NotifierKind::Twilio => {
            let timeout = Duration::from_secs(config.timeout_secs);
            Ok(Arc::new(twilio::TwilioNotifier::from_config(&config.twilio, timeout)?))
        }
        NotifierKind::Log => Ok(Arc::new(log::LogNotifier::new())),
    }
}
