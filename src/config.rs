//! Configuration management for appwatch
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all notification settings. It uses the `figment`
//! crate to load configuration from an `appwatch.toml` file and merge it
//! with environment variables.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::template;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the notification channels.
    pub notify: NotifyConfig,
}

/// Configuration for the notification channels.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    /// Log every status change as a structured tracing event.
    #[serde(default = "default_true")]
    pub log_status_changes: bool,
    /// Configuration for mail notifications.
    pub mail: Option<MailNotifierConfig>,
    /// Configuration for webhook notifications.
    pub webhook: Option<WebhookConfig>,
}

/// Configuration for mail notifications.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailNotifierConfig {
    /// Whether mail notifications are sent.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Carbon-copy addresses.
    #[serde(default)]
    pub cc: Vec<String>,
    /// Sender address, `Name <addr>` form allowed.
    pub from: String,
    /// Subject template, resolved against the instance and the event.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Name of the registered body template to render.
    #[serde(default = "default_template")]
    pub template: String,
    /// The SMTP relay used for delivery.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Configuration for the SMTP relay.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SmtpConfig {
    /// Hostname of the relay.
    pub host: String,
    /// Port of the relay.
    pub port: u16,
    /// Username for SMTP authentication, if the relay requires it.
    pub username: Option<String>,
    /// Password for SMTP authentication.
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS instead of implicit TLS.
    pub starttls: bool,
}

/// Configuration for webhook notifications.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookConfig {
    /// Whether webhook notifications are sent.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// The URL status changes are posted to.
    pub url: String,
    /// Message template for the posted text.
    #[serde(default = "default_subject")]
    pub message: String,
    /// Request timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_subject() -> String {
    "#{instance.registration.name} (#{instance.id}) is #{event.statusInfo.status}".to_string()
}

fn default_template() -> String {
    template::STATUS_CHANGED.to_string()
}

fn default_webhook_timeout() -> u64 {
    10
}

impl Config {
    /// Loads the application configuration from the specified file.
    ///
    /// # Arguments
    /// * `config_path` - The path to the TOML configuration file.
    pub fn load(config_path: &str) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g., APPWATCH_LOG_LEVEL=debug
            .merge(Env::prefixed("APPWATCH_"))
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            notify: NotifyConfig::default(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            log_status_changes: true,
            mail: None,
            webhook: None,
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: None,
            password: None,
            starttls: true,
        }
    }
}
