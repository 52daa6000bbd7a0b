use crate::{
    error::CorredorError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Text-completion provider trait — the extraction brain.
///
/// Every LLM backend (Gemini, OpenAI, ...) implements this trait to provide
/// a uniform prompt-in, text-out interface. Callers treat the provider as a
/// black box; parsing of whatever it returns happens on their side.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send a prompt and get the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, CorredorError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// Messaging Channel trait — the transport seam.
///
/// The WhatsApp transport itself (session, pairing, encryption) lives behind
/// this trait; the gateway only sees messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, CorredorError>;

    /// Send a message through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), CorredorError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), CorredorError>;
}

/// Source of an API key that may rotate at runtime.
///
/// Implementations may read from the local database with a TTL cache and
/// fall back to configuration; providers stay decoupled from the store.
#[async_trait]
pub trait ApiKeySource: Send + Sync {
    /// Resolve the current key. Errors when no key is configured anywhere.
    async fn api_key(&self) -> Result<String, CorredorError>;

    /// Drop any cached value (e.g. after an auth error) so the next call
    /// re-resolves from the backing store.
    async fn invalidate(&self);
}

/// A fixed API key taken from configuration.
pub struct StaticKeySource {
    key: String,
}

impl StaticKeySource {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl ApiKeySource for StaticKeySource {
    async fn api_key(&self) -> Result<String, CorredorError> {
        if self.key.is_empty() {
            return Err(CorredorError::Config("api key not configured".into()));
        }
        Ok(self.key.clone())
    }

    async fn invalidate(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_key_source() {
        let src = StaticKeySource::new("AIza-test");
        assert_eq!(src.api_key().await.unwrap(), "AIza-test");
    }

    #[tokio::test]
    async fn test_static_key_source_empty_is_error() {
        let src = StaticKeySource::new("");
        assert!(src.api_key().await.is_err());
    }
}
