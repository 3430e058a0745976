//! SMS delivery through the Twilio REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::notifier::{Notifier, NotifyError, Result};
use crate::config::TwilioConfig;

pub struct TwilioNotifier {
    client: Client,
    endpoint: String,
    key_sid: String,
    auth_token: String,
    sender: String,
}

/// The parts of Twilio's message resource (or error body) we inspect.
#[derive(Deserialize, Debug)]
struct MessageResponse {
    /// Set on request-level errors, e.g. bad credentials or an invalid `To`.
    code: Option<serde_json::Value>,
    message: Option<String>,
    /// Set when Twilio accepted the request but could not deliver.
    error_code: Option<serde_json::Value>,
    error_message: Option<String>,
    sid: Option<String>,
}

impl TwilioNotifier {
    pub fn from_config(config: &TwilioConfig, timeout: Duration) -> Result<Self> {
        let missing = config.missing_credentials();
        if !missing.is_empty() {
            return Err(NotifyError::NotConfigured(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/Accounts/{}/Messages.json",
                config.base_url.trim_end_matches('/'),
                config.account_sid.as_deref().unwrap_or_default()
            ),
            key_sid: config.number_sid.clone().unwrap_or_default(),
            auth_token: config.auth_token.clone().unwrap_or_default(),
            sender: config.sender().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send(&self, message: &str, destination: &str) -> Result<()> {
        let form = [("Body", message), ("To", destination), ("From", self.sender.as_str())];

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .basic_auth(&self.key_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: MessageResponse = serde_json::from_str(&body).map_err(|e| {
            NotifyError::ParseError(format!("status {}: {}", status, e))
        })?;

        if parsed.code.is_some() || parsed.message.is_some() {
            return Err(NotifyError::Rejected(
                parsed.message.unwrap_or_else(|| status.to_string()),
            ));
        }

        if parsed.error_code.is_some() || parsed.error_message.is_some() {
            return Err(NotifyError::Delivery(
                parsed
                    .error_message
                    .unwrap_or_else(|| format!("error code {:?}", parsed.error_code)),
            ));
        }

        if !status.is_success() {
            return Err(NotifyError::Delivery(format!("status {}", status)));
        }

        tracing::debug!(sid = ?parsed.sid, "Twilio accepted message to {}", destination);
        Ok(())
    }
}
