//! Bot configuration.
//!
//! Loaded once at startup from a JSON file. The core only reads it; `save`
//! exists for admin tooling.
//!
//! ```json
//! {
//!   "prefix": "!",
//!   "channels": { "kitchen": "123456789012345678", "log": "123456789012345679" },
//!   "timeouts": { "category_secs": 300 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "KITCHEN_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "data/config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid channel id \"{0}\": expected 17-20 digits")]
    InvalidChannelId(String),

    #[error("The {0} channel is not configured")]
    MissingChannel(&'static str),

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A platform channel snowflake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if (17..=20).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(ConfigError::InvalidChannelId(s.to_string()))
        }
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub kitchen: Option<ChannelId>,
    #[serde(default)]
    pub log: Option<ChannelId>,
}

/// Every bounded wait in the system, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub vehicle_ack_secs: u64,
    pub vehicle_form_secs: u64,
    pub category_secs: u64,
    pub item_secs: u64,
    pub quantity_secs: u64,
    pub continue_secs: u64,
    pub notes_secs: u64,
    pub cancel_reason_secs: u64,
    pub listener_window_secs: u64,
    pub cleanup_delay_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            vehicle_ack_secs: 120,
            vehicle_form_secs: 60,
            category_secs: 300,
            item_secs: 60,
            quantity_secs: 60,
            continue_secs: 60,
            notes_secs: 60,
            cancel_reason_secs: 60,
            listener_window_secs: 24 * 60 * 60,
            cleanup_delay_secs: 5 * 60,
        }
    }
}

impl TimeoutConfig {
    pub fn vehicle_ack(&self) -> Duration {
        Duration::from_secs(self.vehicle_ack_secs)
    }

    pub fn vehicle_form(&self) -> Duration {
        Duration::from_secs(self.vehicle_form_secs)
    }

    pub fn category(&self) -> Duration {
        Duration::from_secs(self.category_secs)
    }

    pub fn item(&self) -> Duration {
        Duration::from_secs(self.item_secs)
    }

    pub fn quantity(&self) -> Duration {
        Duration::from_secs(self.quantity_secs)
    }

    pub fn continue_decision(&self) -> Duration {
        Duration::from_secs(self.continue_secs)
    }

    pub fn notes(&self) -> Duration {
        Duration::from_secs(self.notes_secs)
    }

    pub fn cancel_reason(&self) -> Duration {
        Duration::from_secs(self.cancel_reason_secs)
    }

    pub fn listener_window(&self) -> Duration {
        Duration::from_secs(self.listener_window_secs)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Promo code file, relative to the working directory.
    #[serde(default = "default_promo_path")]
    pub promo_codes: PathBuf,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_promo_path() -> PathBuf {
    PathBuf::from("data/promocodes.json")
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            channels: ChannelConfig::default(),
            timeouts: TimeoutConfig::default(),
            promo_codes: default_promo_path(),
        }
    }
}

impl BotConfig {
    /// Reads the file named by `KITCHEN_CONFIG`, or `data/config.json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config: Self = serde_json::from_str(&text)?;
                info!(path = %path.display(), prefix = %config.prefix, "Config loaded");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn kitchen_channel(&self) -> Result<&ChannelId, ConfigError> {
        self.channels.kitchen.as_ref().ok_or(ConfigError::MissingChannel("kitchen"))
    }

    pub fn log_channel(&self) -> Result<&ChannelId, ConfigError> {
        self.channels.log.as_ref().ok_or(ConfigError::MissingChannel("log"))
    }
}
