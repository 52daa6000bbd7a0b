use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub whatsapp: Option<WhatsAppConfig>,
}

/// WhatsApp channel config.
///
/// The channel talks to a WhatsApp Web bridge over HTTP; session, pairing,
/// and encryption live in the bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the bridge's HTTP API.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
    /// Bearer token for the bridge API. Empty = no auth (local bridge).
    #[serde(default)]
    pub api_token: String,
    /// Allowed phone numbers (e.g. `["56911223344"]`). Empty = allow all.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bridge_url: default_bridge_url(),
            api_token: String::new(),
            allowed_users: Vec::new(),
        }
    }
}
