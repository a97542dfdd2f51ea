mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::HeraldError;
use defaults::*;

/// Upper bound for the countdown / cancellation granularity.
pub const MAX_POLL_INTERVAL_MS: u64 = 200;

/// Top-level Herald configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub herald: HeraldConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// WhatsApp bridge config.
///
/// The bridge process owns the WhatsApp Web session (QR pairing, session
/// files). Herald only talks to its HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
    /// Bearer token for the bridge. Empty = no auth.
    #[serde(default)]
    pub api_token: String,
    /// Appended to a phone number to form a chat address.
    #[serde(default = "default_chat_suffix")]
    pub chat_suffix: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_status_poll")]
    pub status_poll_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            bridge_url: default_bridge_url(),
            api_token: String::new(),
            chat_suffix: default_chat_suffix(),
            request_timeout_secs: default_request_timeout(),
            status_poll_secs: default_status_poll(),
        }
    }
}

/// Bulk send pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
    /// Countdown refresh and cancellation check granularity.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on a single outbound send.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
    /// Used in `{name}` when a contact has no usable display name.
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
            poll_interval_ms: default_poll_interval_ms(),
            send_timeout_secs: default_send_timeout(),
            fallback_name: default_fallback_name(),
        }
    }
}

impl BulkConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

/// Flat-file locations for contacts and templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_contacts_path")]
    pub contacts_path: String,
    #[serde(default = "default_templates_path")]
    pub templates_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            contacts_path: default_contacts_path(),
            templates_path: default_templates_path(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Bearer token for API authentication. Empty = no auth (for local-only use).
    #[serde(default)]
    pub api_key: String,
    /// Directory served for every non-API path.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            api_key: String::new(),
            static_dir: default_static_dir(),
        }
    }
}

impl Config {
    /// Reject settings the bulk sender cannot honour.
    pub fn validate(&self) -> Result<(), HeraldError> {
        let bulk = &self.bulk;
        if bulk.min_delay_secs > bulk.max_delay_secs {
            return Err(HeraldError::Config(format!(
                "bulk.min_delay_secs ({}) is greater than bulk.max_delay_secs ({})",
                bulk.min_delay_secs, bulk.max_delay_secs
            )));
        }
        if bulk.poll_interval_ms == 0 || bulk.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(HeraldError::Config(format!(
                "bulk.poll_interval_ms must be between 1 and {MAX_POLL_INTERVAL_MS}, got {}",
                bulk.poll_interval_ms
            )));
        }
        if bulk.send_timeout_secs == 0 {
            return Err(HeraldError::Config(
                "bulk.send_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.whatsapp.bridge_url.trim().is_empty() {
            return Err(HeraldError::Config("whatsapp.bridge_url is empty".into()));
        }
        Ok(())
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, HeraldError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| HeraldError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| HeraldError::Config(format!("failed to parse config: {}", e)))?;

    config.validate()?;
    Ok(config)
}
