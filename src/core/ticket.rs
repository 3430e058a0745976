//! Ticket and contact types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sequential ticket number, assigned in registration order starting at 0.
pub type Reference = u64;

/// Errors reported synchronously by queue operations. None of them mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("{field} is required")]
    Validation { field: &'static str },

    #[error("Ticket {0} not found")]
    NotFound(Reference),

    #[error("Ticket {0} already served")]
    AlreadyServed(Reference),
}

/// Who a ticket belongs to and where to reach them.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, alias = "username")]
    pub display_name: String,

    /// SMS destination. Empty means no notification is wanted.
    #[serde(default, alias = "phone")]
    pub contact_address: String,

    #[serde(default, alias = "email")]
    pub email_address: String,
}

impl Contact {
    pub fn new(
        display_name: impl Into<String>,
        contact_address: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            contact_address: contact_address.into(),
            email_address: email_address.into(),
        }
    }

    /// Check required fields in declaration order and report the first one missing.
    pub fn validate(&self) -> Result<(), QueueError> {
        let required = [
            ("displayName", &self.display_name),
            ("contactAddress", &self.contact_address),
            ("emailAddress", &self.email_address),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(QueueError::Validation { field: *field }),
            None => Ok(()),
        }
    }

    pub fn wants_notification(&self) -> bool {
        !self.contact_address.is_empty()
    }
}

/// A queue slot.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub reference: Reference,

    #[serde(flatten)]
    pub contact: Contact,

    pub served: bool,

    pub registered_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub(crate) fn new(reference: Reference, contact: Contact) -> Self {
        Self {
            reference,
            contact,
            served: false,
            registered_at: Utc::now(),
            served_at: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        !self.served
    }
}
