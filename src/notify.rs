//! Operator notifications for critical failures.

use corredor_core::{cache::TtlCache, message::OutgoingMessage, traits::Channel};
use corredor_memory::Store;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

const ADMIN_PHONE_KEY: &str = "ADMIN_PHONE";
const ADMIN_TTL: Duration = Duration::from_secs(300);

/// Sends best-effort alerts to the configured admin phone.
///
/// The number is read from app_config (so it can be changed at runtime)
/// with the config file as fallback, cached for five minutes. Failures to
/// notify are logged and swallowed; alerting must never take down the
/// path that triggered it.
pub struct Notifier {
    channel: Option<Arc<dyn Channel>>,
    store: Store,
    fallback_phone: String,
    cache: Mutex<TtlCache<String>>,
}

impl Notifier {
    pub fn new(channel: Option<Arc<dyn Channel>>, store: Store, fallback_phone: String) -> Self {
        Self {
            channel,
            store,
            fallback_phone,
            cache: Mutex::new(TtlCache::new(ADMIN_TTL)),
        }
    }

    async fn admin_phone(&self) -> String {
        let now = Instant::now();
        {
            let cache = self.cache.lock().await;
            if let Some(phone) = cache.get(now) {
                return phone;
            }
        }

        let phone = match self.store.config_value(ADMIN_PHONE_KEY).await {
            Ok(Some(value)) if !value.is_empty() => value,
            Ok(_) => self.fallback_phone.clone(),
            Err(e) => {
                warn!("failed to read admin phone from app_config: {e}");
                self.fallback_phone.clone()
            }
        };

        self.cache.lock().await.put(phone.clone(), now);
        phone
    }

    /// Send an alert to the operator. No-op when no admin phone or channel
    /// is configured.
    pub async fn alert(&self, text: &str) {
        let Some(ref channel) = self.channel else {
            debug!("notifier: no channel, dropping alert");
            return;
        };

        let phone = self.admin_phone().await;
        if phone.is_empty() {
            debug!("notifier: no admin phone configured, dropping alert");
            return;
        }

        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        let message = OutgoingMessage {
            text: format!("⚠️ Corredor: {text}"),
            reply_target: Some(format!("{digits}@s.whatsapp.net")),
        };

        if let Err(e) = channel.send(message).await {
            error!("failed to send admin notification: {e}");
        }
    }
}
