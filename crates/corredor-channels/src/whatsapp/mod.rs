//! WhatsApp channel over a WhatsApp Web bridge's HTTP API.
//!
//! The bridge owns the session (QR pairing, Signal encryption, reconnects)
//! and exposes messages over long-poll. This side is a plain REST client:
//! poll for inbound messages, POST to send.
//!
//! All messages pass through, including group chats; the gateway needs
//! them for listing intake and owns both the auth policy and the
//! no-reply-in-groups policy.

mod polling;
mod send;
mod types;


use corredor_core::config::WhatsAppConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

/// WhatsApp channel talking to a bridge over HTTP.
pub struct WhatsAppChannel {
    pub(super) config: WhatsAppConfig,
    pub(super) client: reqwest::Client,
    /// Poll cursor — the bridge returns messages after this sequence number.
    pub(super) cursor: Arc<Mutex<Option<u64>>>,
}

impl WhatsAppChannel {
    /// Create a new WhatsApp channel from config.
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            cursor: Arc::new(Mutex::new(None)),
        }
    }
}
