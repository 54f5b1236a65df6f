//! Application configuration management.
//!
//! Configuration is stored at `~/.config/ticketsync/config.json` and every
//! field can be overridden from the environment (see `ENV_*`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::identity::IdentityResolver;
use crate::scheduler::MIN_INTERVAL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "ticketsync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_SUBJECTS_URL: &str = "https://script.google.com/macros/s/AKfycbwXIfuadHykMFrMdPPLLP7y0pm4oZ8TJUnM9SMmDp9BkaVLGu9jupU-CuW8Id-Mm1ylxg/exec?sheetname=user";
pub const DEFAULT_TICKETS_URL: &str = "https://script.google.com/macros/s/AKfycbwXIfuadHykMFrMdPPLLP7y0pm4oZ8TJUnM9SMmDp9BkaVLGu9jupU-CuW8Id-Mm1ylxg/exec?sheetname=ticket";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// HTTP request timeout in seconds, enforced by the transport.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_SUBJECTS_URL: &str = "TICKETSYNC_SUBJECTS_URL";
pub const ENV_TICKETS_URL: &str = "TICKETSYNC_TICKETS_URL";
pub const ENV_POLL_MS: &str = "TICKETSYNC_POLL_MS";
pub const ENV_CACHE_DIR: &str = "TICKETSYNC_CACHE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub subjects_url: String,
    pub tickets_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    /// Views under this path prefix may run without a subject.
    pub admin_prefix: String,
    /// Where to send views that need a subject but have none.
    pub fallback_path: String,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subjects_url: DEFAULT_SUBJECTS_URL.to_string(),
            tickets_url: DEFAULT_TICKETS_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            admin_prefix: "/admin".to_string(),
            fallback_path: "/invalid".to_string(),
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent), then apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_SUBJECTS_URL) {
            self.subjects_url = url;
        }
        if let Some(url) = lookup(ENV_TICKETS_URL) {
            self.tickets_url = url;
        }
        if let Some(raw) = lookup(ENV_POLL_MS) {
            match raw.trim().parse() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_POLL_MS),
            }
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_INTERVAL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resolver(&self) -> IdentityResolver {
        IdentityResolver::new(self.admin_prefix.clone(), self.fallback_path.clone())
    }
}
