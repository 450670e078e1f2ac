//! In-process cache backend built on moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache as MokaCache;

use super::{CacheBackend, CacheConfig, CacheError};

/// Cached payload with the TTL it was written with.
#[derive(Debug, Clone)]
struct Entry {
    payload: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL given at write time.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory backend with per-entry expiry.
#[derive(Clone)]
pub struct MokaBackend {
    entries: MokaCache<String, Entry>,
}

impl MokaBackend {
    /// Create a backend sized by `config.max_capacity`.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { entries }
    }
}

impl CacheBackend for MokaBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|e| e.payload.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            payload: value.into(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_cache_is_empty() {
        let cache = MokaBackend::new(&CacheConfig::default());
        assert_eq!(cache.get("graph:v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MokaBackend::new(&CacheConfig::default());

        cache
            .set("graph:v1", "{}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("graph:v1").await.unwrap().as_deref(), Some("{}"));

        cache.delete("graph:v1").await.unwrap();
        assert_eq!(cache.get("graph:v1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_expire_after_their_own_ttl() {
        let cache = MokaBackend::new(&CacheConfig::default());

        cache
            .set("short", "1".to_string(), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set("long", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn overwrite_resets_ttl() {
        let cache = MokaBackend::new(&CacheConfig::default());

        cache
            .set("k", "old".to_string(), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set("k", "new".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
