use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::dashboard::{DEFAULT_MIN_RENDER_INTERVAL, DEFAULT_PAGE_SIZE};
use crate::scheduler::DEFAULT_HEARTBEAT_INTERVAL;
use crate::{API_BASE, API_ORIGIN, USER_AGENT};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Newline-delimited wallet address list.
    #[serde(default = "default_wallets_path")]
    pub wallets_path: PathBuf,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Reward service endpoint and the fixed headers sent with every request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_origin")]
    pub origin: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Runtime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// Seconds between heartbeat updates for each wallet.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
    /// Wallets shown per dashboard page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Minimum gap between two dashboard redraws.
    #[serde(default = "default_min_render_interval")]
    pub min_render_interval_ms: u64,
}

fn default_wallets_path() -> PathBuf {
    PathBuf::from("data.txt")
}

fn default_base_url() -> String {
    API_BASE.to_string()
}

fn default_origin() -> String {
    API_ORIGIN.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_heartbeat_interval() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL.as_secs()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_min_render_interval() -> u64 {
    DEFAULT_MIN_RENDER_INTERVAL.as_millis() as u64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wallets_path: default_wallets_path(),
            api: ApiConfig::default(),
            settings: SettingsConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
            page_size: default_page_size(),
            min_render_interval_ms: default_min_render_interval(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SettingsConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn min_render_interval(&self) -> Duration {
        Duration::from_millis(self.min_render_interval_ms)
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config if the file exists, otherwise fall back to defaults.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.settings.page_size == 0 {
            bail!("settings.page_size must be at least 1");
        }
        if self.settings.heartbeat_interval_secs == 0 {
            bail!("settings.heartbeat_interval_secs must be at least 1");
        }
        Ok(())
    }
}
