mod channels;
mod defaults;
mod providers;

#[cfg(test)]
mod tests;

pub use channels::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CorredorError;
use defaults::*;

/// Top-level Corredor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corredor: CorredorConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub followup: FollowUpConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorredorConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CorredorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether sender filtering is enforced.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Message sent to unauthorized users in direct chats.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            deny_message: default_deny_message(),
        }
    }
}

/// Local database config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Sheet store config.
///
/// `fallback_sheet_id` is used when no sheet in the local database is
/// flagged as the designated property log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// OAuth bearer token for the Sheets API. Falls back to the
    /// GOOGLE_SHEETS_TOKEN environment variable when empty.
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub fallback_sheet_id: String,
    #[serde(default = "default_fallback_tab")]
    pub fallback_tab: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            fallback_sheet_id: String::new(),
            fallback_tab: default_fallback_tab(),
        }
    }
}

/// Extraction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Approximate CLP per UF, baked into the extraction prompt.
    #[serde(default = "default_uf_rate")]
    pub uf_rate_clp: u64,
    /// Approximate CLP per USD, baked into the extraction prompt.
    #[serde(default = "default_usd_rate")]
    pub usd_rate_clp: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            uf_rate_clp: default_uf_rate(),
            usd_rate_clp: default_usd_rate(),
        }
    }
}

/// Follow-up scheduler config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_followup_poll")]
    pub poll_interval_secs: u64,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_followup_poll(),
        }
    }
}

/// Operator notification config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    /// Admin phone for critical failure alerts. Empty = disabled. The
    /// app_config table may override this at runtime.
    #[serde(default)]
    pub admin_phone: String,
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
pub fn load(path: &str) -> Result<Config, CorredorError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config {
            corredor: CorredorConfig::default(),
            auth: AuthConfig::default(),
            provider: ProviderConfig::default(),
            channel: ChannelConfig::default(),
            memory: MemoryConfig::default(),
            sheets: SheetsConfig::default(),
            extract: ExtractConfig::default(),
            followup: FollowUpConfig::default(),
            notify: NotifyConfig::default(),
        });
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| CorredorError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CorredorError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
