//! Configuration loading for walkin.
//!
//! Settings come from an optional JSON file (`--config <path>` or
//! `~/.walkin/settings.json`), then environment variables override individual keys.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com/2010-04-01";
pub const DEFAULT_SENDER_NUMBER: &str = "+18775657133";

/// Get the walkin home directory (~/.walkin).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".walkin"))
}

/// Get the default settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from `path`, or from the default location when `path` is `None`.
///
/// An explicit path must exist; a missing default file just means defaults.
/// Environment overrides are applied before validation.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Settings file not found at {}",
                    path.display()
                )));
            }
            read_settings_file(path)?
        }
        None => {
            let default_path = get_settings_path()?;
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                tracing::debug!("No settings file at {}, using defaults", default_path.display());
                Settings::default()
            }
        }
    };

    settings.apply_env_from(|key| std::env::var(key).ok())?;
    settings.validate()?;

    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Top-level settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Settings {
    /// Apply environment overrides, reading variables through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("PORT '{}' is not a valid port", port)))?;
        }
        if let Some(kind) = lookup("WALKIN_NOTIFIER") {
            self.notifier.kind = Some(kind.parse()?);
        }

        let twilio = &mut self.notifier.twilio;
        if let Some(url) = lookup("TWILIO_BASE_URL") {
            twilio.base_url = url;
        }
        if let Some(sid) = lookup("TWILIO_ACCOUNT_SID") {
            twilio.account_sid = Some(sid);
        }
        if let Some(sid) = lookup("TWILIO_NUMBER_SID") {
            twilio.number_sid = Some(sid);
        }
        if let Some(token) = lookup("TWILIO_AUTH_TOKEN") {
            twilio.auth_token = Some(token);
        }
        if let Some(number) = lookup("TWILIO_PHONE_NUMBER") {
            twilio.phone_number = Some(number);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.dispatch.queue_capacity == 0 {
            return Err(Error::Config(
                "dispatch.queue_capacity must be non-zero".to_string(),
            ));
        }
        if self.notifier.kind == Some(NotifierKind::Twilio) {
            let missing = self.notifier.twilio.missing_credentials();
            if !missing.is_empty() {
                return Err(Error::Config(format!(
                    "Twilio notifier selected but missing: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Copy with credentials blanked out, for display.
    pub fn masked(&self) -> Settings {
        let mut masked = self.clone();
        let twilio = &mut masked.notifier.twilio;
        for secret in [
            &mut twilio.account_sid,
            &mut twilio.number_sid,
            &mut twilio.auth_token,
        ] {
            if secret.is_some() {
                *secret = Some("****".to_string());
            }
        }
        masked
    }
}

/// HTTP listener configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Which notifier delivers messages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// SMS through the Twilio REST API.
    Twilio,
    /// Write messages to the log only.
    Log,
}

impl std::str::FromStr for NotifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "twilio" => Ok(NotifierKind::Twilio),
            "log" => Ok(NotifierKind::Log),
            other => Err(Error::Config(format!("Unknown notifier '{}'", other))),
        }
    }
}

impl std::fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierKind::Twilio => write!(f, "twilio"),
            NotifierKind::Log => write!(f, "log"),
        }
    }
}

/// Notifier configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NotifierConfig {
    /// Unset means Twilio when its credentials are complete, otherwise log.
    #[serde(default)]
    pub kind: Option<NotifierKind>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub twilio: TwilioConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: None,
            timeout_secs: default_timeout_secs(),
            twilio: TwilioConfig::default(),
        }
    }
}

impl NotifierConfig {
    pub fn resolved_kind(&self) -> NotifierKind {
        match self.kind {
            Some(kind) => kind,
            None if self.twilio.missing_credentials().is_empty() => NotifierKind::Twilio,
            None => {
                tracing::warn!(
                    "Twilio credentials incomplete ({}), notifications will only be logged",
                    self.twilio.missing_credentials().join(", ")
                );
                NotifierKind::Log
            }
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Twilio account configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TwilioConfig {
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,
    pub account_sid: Option<String>,
    /// Key SID used as the basic-auth username.
    pub number_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Sender number.
    pub phone_number: Option<String>,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            base_url: default_twilio_base_url(),
            account_sid: None,
            number_sid: None,
            auth_token: None,
            phone_number: None,
        }
    }
}

impl TwilioConfig {
    /// Names of the credential variables that are not set.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("TWILIO_ACCOUNT_SID", &self.account_sid),
            ("TWILIO_NUMBER_SID", &self.number_sid),
            ("TWILIO_AUTH_TOKEN", &self.auth_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn sender(&self) -> &str {
        self.phone_number.as_deref().unwrap_or(DEFAULT_SENDER_NUMBER)
    }
}

fn default_twilio_base_url() -> String {
    DEFAULT_TWILIO_BASE_URL.to_string()
}

/// Notification queue configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DispatchConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// How long shutdown waits for pending notifications.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.notifier.twilio.base_url, DEFAULT_TWILIO_BASE_URL);
        assert_eq!(settings.notifier.twilio.sender(), DEFAULT_SENDER_NUMBER);
        assert_eq!(settings.dispatch.queue_capacity, 256);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"port": 9000}, "notifier": {"kind": "log"}}"#,
        )
        .unwrap();

        let settings = read_settings_file(&path).unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.notifier.kind, Some(NotifierKind::Log));
        assert_eq!(settings.notifier.timeout_secs, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");

        assert!(matches!(load_settings(Some(path.as_path())), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env_from(env(&[
                ("PORT", "9100"),
                ("TWILIO_ACCOUNT_SID", "AC123"),
                ("TWILIO_NUMBER_SID", "SK123"),
                ("TWILIO_AUTH_TOKEN", "secret"),
                ("TWILIO_PHONE_NUMBER", ""),
            ]))
            .unwrap();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.notifier.twilio.account_sid.as_deref(), Some("AC123"));
        assert_eq!(settings.notifier.twilio.phone_number, None);
        assert!(settings.notifier.twilio.missing_credentials().is_empty());
        assert_eq!(settings.notifier.resolved_kind(), NotifierKind::Twilio);
    }

    #[test]
    fn test_invalid_port_env() {
        let mut settings = Settings::default();
        let result = settings.apply_env_from(env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_twilio_without_credentials_is_rejected() {
        let mut settings = Settings::default();
        settings
            .apply_env_from(env(&[("WALKIN_NOTIFIER", "twilio"), ("TWILIO_ACCOUNT_SID", "AC1")]))
            .unwrap();

        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("TWILIO_NUMBER_SID"));
        assert!(err.contains("TWILIO_AUTH_TOKEN"));
        assert!(!err.contains("TWILIO_ACCOUNT_SID"));
    }

    #[test]
    fn test_unset_kind_falls_back_to_log() {
        let settings = Settings::default();
        assert_eq!(settings.notifier.resolved_kind(), NotifierKind::Log);
    }

    #[test]
    fn test_masked_hides_secrets() {
        let mut settings = Settings::default();
        settings.notifier.twilio.auth_token = Some("secret".to_string());

        let masked = settings.masked();
        assert_eq!(masked.notifier.twilio.auth_token.as_deref(), Some("****"));
        assert_eq!(masked.notifier.twilio.account_sid, None);
    }
}
