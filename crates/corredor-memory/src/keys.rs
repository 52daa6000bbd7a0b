//! Rotatable API key resolution with a TTL cache.
//!
//! Resolution order: app_config table → config file value → environment
//! variable named after the config key. The database read is cached for
//! five minutes so every extraction doesn't hit SQLite; providers call
//! `invalidate()` on auth errors to force a re-read.

use crate::store::Store;
use async_trait::async_trait;
use corredor_core::{cache::TtlCache, error::CorredorError, traits::ApiKeySource};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

const KEY_TTL: Duration = Duration::from_secs(300);

/// `ApiKeySource` backed by the app_config table.
pub struct DbKeySource {
    store: Store,
    /// app_config key and env var name, e.g. "GEMINI_API_KEY".
    config_key: String,
    /// Value from the config file, used when the table has no entry.
    fallback: String,
    cache: Mutex<TtlCache<String>>,
}

impl DbKeySource {
    pub fn new(store: Store, config_key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            store,
            config_key: config_key.into(),
            fallback: fallback.into(),
            cache: Mutex::new(TtlCache::new(KEY_TTL)),
        }
    }
}

#[async_trait]
impl ApiKeySource for DbKeySource {
    async fn api_key(&self) -> Result<String, CorredorError> {
        let now = Instant::now();

        {
            let cache = self.cache.lock().await;
            if let Some(key) = cache.get(now) {
                return Ok(key);
            }
        }

        let from_db = match self.store.config_value(&self.config_key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read {} from app_config: {e}", self.config_key);
                None
            }
        };

        let key = from_db
            .filter(|k| !k.is_empty())
            .or_else(|| Some(self.fallback.clone()).filter(|k| !k.is_empty()))
            .or_else(|| std::env::var(&self.config_key).ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| {
                CorredorError::Config(format!("{} is not configured", self.config_key))
            })?;

        self.cache.lock().await.put(key.clone(), now);
        Ok(key)
    }

    async fn invalidate(&self) {
        self.cache.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_store;

    #[tokio::test]
    async fn test_db_value_wins() {
        let store = test_store().await;
        store
            .set_config_value("TEST_KEY_A", "from-db")
            .await
            .unwrap();
        let source = DbKeySource::new(store, "TEST_KEY_A", "from-config");
        assert_eq!(source.api_key().await.unwrap(), "from-db");
    }

    #[tokio::test]
    async fn test_fallback_when_db_empty() {
        let store = test_store().await;
        let source = DbKeySource::new(store, "TEST_KEY_B", "from-config");
        assert_eq!(source.api_key().await.unwrap(), "from-config");
    }

    #[tokio::test]
    async fn test_error_when_nothing_configured() {
        let store = test_store().await;
        let source = DbKeySource::new(store, "TEST_KEY_UNSET_ANYWHERE", "");
        assert!(source.api_key().await.is_err());
    }

    #[tokio::test]
    async fn test_cached_value_survives_db_change_until_invalidated() {
        let store = test_store().await;
        store
            .set_config_value("TEST_KEY_C", "first")
            .await
            .unwrap();
        let source = DbKeySource::new(store.clone(), "TEST_KEY_C", "");

        assert_eq!(source.api_key().await.unwrap(), "first");

        // Rotation is invisible while the cache slot is warm...
        store
            .set_config_value("TEST_KEY_C", "second")
            .await
            .unwrap();
        assert_eq!(source.api_key().await.unwrap(), "first");

        // ...and visible after invalidation.
        source.invalidate().await;
        assert_eq!(source.api_key().await.unwrap(), "second");
    }
}
