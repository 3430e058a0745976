//! CLI commands for walkin using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_settings, Settings};
use crate::core::QueueService;
use crate::notify::{create_notifier, spawn_dispatcher};
use crate::web::{run_server, shutdown_signal};

/// walkin - walk-in service queue with SMS turn notifications.
#[derive(Parser)]
#[command(name = "walkin")]
#[command(version)]
#[command(about = "Walk-in service queue with SMS turn notifications", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to ~/.walkin/settings.json)
    #[arg(long, global = true, env = "WALKIN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the queue server
    Serve {
        /// Listen address (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides settings)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Config,

    /// Send one message through the configured notifier
    Notify {
        /// Destination address
        #[arg(long)]
        to: String,

        /// Message text
        #[arg(long, default_value = "walkin test message")]
        message: String,
    },
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        let settings = load_settings(self.config.as_deref())?;

        match &self.command {
            Command::Serve { host, port } => cmd_serve(settings, host.clone(), *port).await,
            Command::Config => cmd_config(&settings),
            Command::Notify { to, message } => cmd_notify(&settings, to, message).await,
        }
    }
}

// Command implementations

async fn cmd_serve(mut settings: Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    settings.validate()?;

    let notifier = create_notifier(&settings.notifier).context("Failed to create notifier")?;
    tracing::info!("Using {} notifier", notifier.name());

    let (notifications, worker) = spawn_dispatcher(notifier, settings.dispatch.queue_capacity);
    let service = Arc::new(QueueService::new(notifications));

    println!("Starting walkin on {}:{}...", settings.server.host, settings.server.port);
    println!("API endpoints:");
    println!("  POST /registerUser");
    println!("  POST /serveUser?id=<reference>");
    println!("  GET  /listUsers");
    println!("  GET  /stats");
    println!("  GET  /health");
    println!();
    println!("Press Ctrl+C to stop");

    let served = run_server(&settings.server, Arc::clone(&service), shutdown_signal()).await;

    // Dropping the last queue handle lets the worker drain and exit.
    tracing::info!("{}", service.stats().await);
    drop(service);
    let grace = Duration::from_secs(settings.dispatch.shutdown_grace_secs);
    if tokio::time::timeout(grace, worker).await.is_err() {
        tracing::warn!("Pending notifications not delivered within {:?}", grace);
    }

    served.context("Web server error")
}

fn cmd_config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&settings.masked())?);
    println!();
    println!("Notifier: {}", settings.notifier.resolved_kind());
    Ok(())
}

async fn cmd_notify(settings: &Settings, to: &str, message: &str) -> Result<()> {
    let notifier = create_notifier(&settings.notifier).context("Failed to create notifier")?;

    notifier
        .send(message, to)
        .await
        .with_context(|| format!("Failed to send via {}", notifier.name()))?;

    println!("Sent via {} to {}", notifier.name(), to);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let args = Commands::parse_from(["walkin", "serve", "--port", "9000"]);
        assert!(args.config.is_none());
        match args.command {
            Command::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_notify_with_config() {
        let args = Commands::parse_from([
            "walkin",
            "notify",
            "--to",
            "+15550001",
            "--config",
            "/tmp/walkin.json",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/walkin.json")));
        match args.command {
            Command::Notify { to, message } => {
                assert_eq!(to, "+15550001");
                assert_eq!(message, "walkin test message");
            }
            _ => panic!("expected notify"),
        }
    }

    #[tokio::test]
    async fn test_notify_with_log_notifier() {
        let settings = Settings::default();
        assert!(cmd_notify(&settings, "+15550001", "hello").await.is_ok());
    }
}
