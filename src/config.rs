//! Analytics API configuration stored in ~/.teampulse/config.json.
//!
//! Layering, lowest to highest: built-in defaults, the config file, the
//! `TEAMPULSE_*` environment variables, command-line flags. Validation runs
//! once on the merged result.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "TEAMPULSE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TEAMPULSE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL including the versioned path prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. A request that exceeds it counts as failed.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api/v1/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the base URL, forcing a trailing slash so relative endpoint
    /// paths resolve beneath the version prefix instead of replacing it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.base_url().map(|_| ())
    }

    fn apply_env(
        &mut self,
        base_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = timeout_secs {
            self.request_timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
        }
        Ok(())
    }

    fn apply_flags(&mut self, flags: &ConfigOverrides) {
        if let Some(url) = &flags.base_url {
            self.base_url = url.clone();
        }
        if let Some(secs) = flags.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".teampulse").join("config.json"))
}

/// Load the effective config: `~/.teampulse/config.json`, then the
/// environment, then `flags`.
pub fn load_config(flags: &ConfigOverrides) -> Result<ApiConfig, ConfigError> {
    load_layered(
        &config_path()?,
        std::env::var(ENV_API_URL).ok(),
        std::env::var(ENV_TIMEOUT_SECS).ok(),
        flags,
    )
}

fn load_layered(
    path: &Path,
    env_url: Option<String>,
    env_timeout: Option<String>,
    flags: &ConfigOverrides,
) -> Result<ApiConfig, ConfigError> {
    let mut config = load_config_from(path)?;
    config.apply_env(env_url, env_timeout)?;
    config.apply_flags(flags);
    config.validate()?;
    Ok(config)
}

/// Load config from a specific file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<ApiConfig, ConfigError> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(ApiConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(serde_json::from_str(&content)?)
}
